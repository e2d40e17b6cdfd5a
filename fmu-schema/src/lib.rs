//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]

mod error;
mod model_description;
mod variable_table;

pub use error::Error;
pub use model_description::{parse_model_description, FmiMajorVersion, ModelDescriptor};
pub use variable_table::VariableTable;

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

const MODEL_DESCRIPTION: &str = "modelDescription.xml";

/// An FMU archive extracted to a private temporary directory, with its
/// `modelDescription.xml` already parsed.
///
/// Holding the `tempfile::TempDir` alive for the lifetime of this struct is
/// what makes extraction RAII: dropping an `ExtractedFmu` removes the
/// working directory, mirroring the "delete the working directory" half of
/// the adapter's `close()` contract one layer down.
pub struct ExtractedFmu {
    dir: tempfile::TempDir,
    descriptor: ModelDescriptor,
}

impl ExtractedFmu {
    /// Extract `archive` and parse its model description.
    pub fn open(archive: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("modalsim-fmu").tempdir()?;
        extract_archive(archive.as_ref(), dir.path())?;

        let descr_path = dir.path().join(MODEL_DESCRIPTION);
        let xml = std::fs::read_to_string(&descr_path).map_err(|source| Error::MissingFile {
            path: descr_path.clone(),
            source,
        })?;
        let descriptor = parse_model_description(&xml)?;

        Ok(Self { dir, descriptor })
    }

    /// Root of the extracted archive.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path to the FMU's `resources` directory, as a `file://` URL string.
    pub fn resource_url(&self) -> String {
        format!("file://{}", self.path().join("resources").display())
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Best-effort guess at the shared library path for the current platform.
    pub fn shared_library_path(&self) -> PathBuf {
        let platform_dir = match (
            self.descriptor.fmi_version,
            std::env::consts::OS,
            std::env::consts::ARCH,
        ) {
            (FmiMajorVersion::Fmi2, "linux", "x86_64") => "linux64",
            (FmiMajorVersion::Fmi2, "macos", "x86_64") => "darwin64",
            (FmiMajorVersion::Fmi2, "windows", "x86_64") => "win64",
            (FmiMajorVersion::Fmi3, "linux", "x86_64") => "x86_64-linux",
            (FmiMajorVersion::Fmi3, "macos", "x86_64") => "x86_64-darwin",
            (FmiMajorVersion::Fmi3, "windows", "x86_64") => "x86_64-windows",
            (_, os, arch) => {
                log::warn!("no known FMI binaries folder for {os}/{arch}, guessing linux64");
                "linux64"
            }
        };
        let fname = format!(
            "{}{}",
            self.descriptor.model_identifier,
            std::env::consts::DLL_SUFFIX
        );
        self.path().join("binaries").join(platform_dir).join(fname)
    }
}

fn extract_archive(archive: &Path, outdir: &Path) -> Result<()> {
    log::trace!("extracting {} into {}", archive.display(), outdir.display());
    let file = std::fs::File::open(archive).map_err(|source| Error::MissingFile {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            continue;
        };
        let outpath = outdir.join(relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut outfile = std::fs::File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with_model_description(xml: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut zip = zip::ZipWriter::new(file.reopen().unwrap());
        zip.start_file(MODEL_DESCRIPTION, Default::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        file
    }

    #[test]
    fn extracts_and_parses() {
        let xml = r#"<fmiModelDescription fmiVersion="2.0" modelName="Bouncer" guid="{abc}">
            <CoSimulation modelIdentifier="Bouncer"/>
            <ModelVariables>
                <ScalarVariable name="h" valueReference="0"><Real/></ScalarVariable>
                <ScalarVariable name="v" valueReference="1"><Real/></ScalarVariable>
            </ModelVariables>
        </fmiModelDescription>"#;
        let archive = zip_with_model_description(xml);
        let fmu = ExtractedFmu::open(archive.path()).unwrap();
        assert_eq!(fmu.descriptor().model_identifier, "Bouncer");
        assert_eq!(fmu.descriptor().guid, "{abc}");
        assert_eq!(fmu.descriptor().variables.value_reference("h"), Some(0));
        assert_eq!(fmu.descriptor().variables.value_reference("v"), Some(1));
    }
}
