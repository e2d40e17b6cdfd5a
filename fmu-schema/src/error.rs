use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read {path}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed modelDescription.xml: {0}")]
    Xml(String),

    #[error("modelDescription.xml is missing required attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("unsupported fmiVersion `{0}`, expected a string starting with \"2.\" or \"3.\"")]
    UnsupportedFmiVersion(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
