use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{Error, Result, VariableTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmiMajorVersion {
    Fmi2,
    Fmi3,
}

/// The reduced projection of `modelDescription.xml` that `modalsim`
/// consumes: model identifier, GUID, and a scalar-variable value-reference
/// table. See `fmu-schema`'s crate docs for why nothing richer is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub fmi_version: FmiMajorVersion,
    pub model_identifier: String,
    pub guid: String,
    pub variables: VariableTable,
}

fn attr(e: &quick_xml::events::BytesStart, name: &str) -> Option<String> {
    e.attributes().filter_map(|a| a.ok()).find_map(|a| {
        (a.key.as_ref() == name.as_bytes())
            .then(|| String::from_utf8_lossy(&a.value).into_owned())
    })
}

/// Parse a `modelDescription.xml` document into a [`ModelDescriptor`].
///
/// Supports both FMI 2.0 (`<ScalarVariable name=".." valueReference=".."/>`
/// nested under `<ModelVariables>`, `guid` on the root element, `modelIdentifier`
/// on the `<CoSimulation>` element) and FMI 3.0 (`<Float64 name=".."
/// valueReference=".."/>`-style typed variable elements, `instantiationToken`
/// on the root element).
pub fn parse_model_description(xml: &str) -> Result<ModelDescriptor> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut fmi_version = None;
    let mut guid = None;
    let mut model_identifier = None;
    let mut variables = VariableTable::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"fmiModelDescription" => {
                    let version_str = attr(&e, "fmiVersion")
                        .ok_or(Error::MissingAttribute("fmiVersion"))?;
                    fmi_version = Some(if version_str.starts_with("2.") {
                        FmiMajorVersion::Fmi2
                    } else if version_str.starts_with("3.") {
                        FmiMajorVersion::Fmi3
                    } else {
                        return Err(Error::UnsupportedFmiVersion(version_str));
                    });
                    guid = attr(&e, "guid").or_else(|| attr(&e, "instantiationToken"));
                }
                b"CoSimulation" => {
                    model_identifier = attr(&e, "modelIdentifier");
                }
                b"ScalarVariable" | b"Float64" | b"Float32" => {
                    if let (Some(name), Some(vr)) =
                        (attr(&e, "name"), attr(&e, "valueReference"))
                    {
                        let vr: u32 = vr
                            .parse()
                            .map_err(|_| Error::Xml(format!("bad valueReference `{vr}`")))?;
                        variables.insert(name, vr);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    Ok(ModelDescriptor {
        fmi_version: fmi_version.ok_or(Error::MissingAttribute("fmiVersion"))?,
        model_identifier: model_identifier.ok_or(Error::MissingAttribute("modelIdentifier"))?,
        guid: guid.ok_or(Error::MissingAttribute("guid"))?,
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fmi3_style_typed_variables() {
        let xml = r#"<fmiModelDescription fmiVersion="3.0" modelName="Bouncer" instantiationToken="{xyz}">
            <CoSimulation modelIdentifier="Bouncer"/>
            <ModelVariables>
                <Float64 name="h" valueReference="0" causality="output"/>
                <Float64 name="v" valueReference="1" causality="output"/>
            </ModelVariables>
        </fmiModelDescription>"#;
        let descr = parse_model_description(xml).unwrap();
        assert_eq!(descr.fmi_version, FmiMajorVersion::Fmi3);
        assert_eq!(descr.guid, "{xyz}");
        assert_eq!(descr.variables.value_reference("h"), Some(0));
    }

    #[test]
    fn missing_guid_is_an_error() {
        let xml = r#"<fmiModelDescription fmiVersion="2.0" modelName="Bouncer">
            <CoSimulation modelIdentifier="Bouncer"/>
        </fmiModelDescription>"#;
        assert!(matches!(
            parse_model_description(xml),
            Err(Error::MissingAttribute("guid"))
        ));
    }
}
