// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status document parsing.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::ParseError;
use crate::types::TempUnit;

/// Name of the document root the appliance always answers with.
const ROOT_ELEMENT: &str = "response";

/// Field carrying the temperature unit indicator.
pub(crate) const TEMP_UNITS_FIELD: &str = "tempunits";

/// Fields that only carry meaning when solar heating is installed.
const SOLAR_FIELDS: [&str; 2] = ["soltemp", "solarht"];

/// Section of the status document a field was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `<system>`: run state, operating mode, freeze protection, sensors.
    System,
    /// `<equipment>`: circuits, features and other switchable equipment.
    Equipment,
    /// `<temp>`: temperatures, setpoints, heat settings and units.
    Temp,
    /// Any other section.
    Other,
}

impl Section {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "system" => Self::System,
            "equipment" => Self::Equipment,
            "temp" => Self::Temp,
            _ => Self::Other,
        }
    }
}

/// One field of a status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusField {
    /// Section the field was found in.
    pub section: Section,
    /// Raw text of the element, empty for elements without text.
    pub value: String,
}

/// Snapshot of the appliance state parsed from one `status.xml` response.
///
/// The document looks like:
///
/// ```xml
/// <response>
///   <system><runstate>50</runstate><opmode>0</opmode></system>
///   <equipment><circuit1>1</circuit1><circuit2></circuit2></equipment>
///   <temp><pooltemp>78</pooltemp><tempunits>F</tempunits></temp>
/// </response>
/// ```
///
/// Every leaf element below a section becomes one field. Elements without
/// text are kept with an empty value; the appliance uses them for equipment
/// that is not installed.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::response::ApplianceStatus;
/// use autelis_nodeserver::types::TempUnit;
///
/// let status = ApplianceStatus::parse(
///     "<response><equipment><circuit1>1</circuit1></equipment>\
///      <temp><tempunits>C</tempunits></temp></response>",
/// )
/// .unwrap();
/// assert_eq!(status.value("circuit1"), Some("1"));
/// assert_eq!(status.temp_unit().unwrap(), Some(TempUnit::Celsius));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplianceStatus {
    fields: BTreeMap<String, StatusField>,
}

impl ApplianceStatus {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `status.xml` response body.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the body is not well-formed XML, if its root
    /// element is not `<response>`, or if the document is cut short.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut status = Self::new();
        let mut path: Vec<String> = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(element) => {
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    if path.is_empty() {
                        check_root(&name)?;
                        saw_root = true;
                    } else if path.len() == 2 {
                        status.insert(Section::from_tag(&path[1]), &name, "");
                    }
                    path.push(name);
                }
                Event::Empty(element) => {
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    if path.is_empty() {
                        check_root(&name)?;
                        saw_root = true;
                    } else if path.len() == 2 {
                        status.insert(Section::from_tag(&path[1]), &name, "");
                    }
                }
                Event::Text(text) if path.len() == 3 => {
                    let text = text.unescape()?;
                    if let Some(field) = status.fields.get_mut(&path[2]) {
                        field.value.push_str(&text);
                    }
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = path.last() {
            return Err(ParseError::Truncated(open.clone()));
        }
        if !saw_root {
            return Err(ParseError::UnexpectedRoot("empty document".to_string()));
        }

        Ok(status)
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, section: Section, name: &str, value: &str) {
        self.fields.insert(
            name.to_string(),
            StatusField {
                section,
                value: value.to_string(),
            },
        );
    }

    /// Returns the field with the given name, including empty ones.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&StatusField> {
        self.fields.get(name)
    }

    /// Returns the value of a field if it is present and non-empty.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|f| f.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Iterates over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &StatusField)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Returns the number of fields, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the snapshot has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the temperature unit indicator, if reported.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the indicator is neither `F` nor `C`.
    pub fn temp_unit(&self) -> Result<Option<TempUnit>, ParseError> {
        self.value(TEMP_UNITS_FIELD).map(str::parse).transpose()
    }

    /// Drops the solar sensor and solar heat fields.
    #[must_use]
    pub fn without_solar(mut self) -> Self {
        for name in SOLAR_FIELDS {
            self.fields.remove(name);
        }
        self
    }
}

fn check_root(name: &str) -> Result<(), ParseError> {
    if name == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot(name.to_string()))
    }
}
