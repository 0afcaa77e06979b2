//! Reference exon annotations
//!
//! A [`ReferenceDataProvider`] supplies the exon table the plot is drawn
//! against. [`LocalReference`] reads an existing file; with the `download`
//! feature, [`BiomartReference`] fetches the GRCh38 exon export from Ensembl
//! BioMart into a cache file first.

use crate::core::UnavailableError;
use crate::formats::exon_table::{read_exon_file, ExonTable};
use std::path::{Path, PathBuf};

/// Default location of the cached exon export
pub const DEFAULT_REFERENCE_PATH: &str = "ensembl_exon_positions/b38_downloaded";

/// BioMart service endpoint
pub const BIOMART_URL: &str = "http://www.ensembl.org/biomart/martservice";

/// BioMart query for the eight exon table columns, TSV without header
pub const BIOMART_EXON_QUERY: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<!DOCTYPE Query>"#,
    r#"<Query virtualSchemaName="default" formatter="TSV" header="0" uniqueRows="0" count="" datasetConfigVersion="0.6">"#,
    r#"<Dataset name="hsapiens_gene_ensembl" interface="default">"#,
    r#"<Attribute name="ensembl_gene_id"/>"#,
    r#"<Attribute name="ensembl_transcript_id"/>"#,
    r#"<Attribute name="exon_chrom_start"/>"#,
    r#"<Attribute name="exon_chrom_end"/>"#,
    r#"<Attribute name="start_position"/>"#,
    r#"<Attribute name="end_position"/>"#,
    r#"<Attribute name="external_gene_name"/>"#,
    r#"<Attribute name="ensembl_exon_id"/>"#,
    r#"</Dataset>"#,
    r#"</Query>"#,
);

/// Source of the exon annotation table
pub trait ReferenceDataProvider {
    /// Obtain the full exon table
    fn fetch(&self) -> Result<ExonTable, UnavailableError>;
}

/// Exon table already on disk
#[derive(Debug, Clone)]
pub struct LocalReference {
    path: PathBuf,
}

impl LocalReference {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for LocalReference {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_PATH)
    }
}

impl ReferenceDataProvider for LocalReference {
    fn fetch(&self) -> Result<ExonTable, UnavailableError> {
        if !self.path.is_file() {
            return Err(UnavailableError::Missing(self.path.clone()));
        }
        Ok(read_exon_file(&self.path)?)
    }
}

#[cfg(feature = "download")]
pub use download::BiomartReference;

#[cfg(feature = "download")]
mod download {
    use super::{LocalReference, ReferenceDataProvider, BIOMART_EXON_QUERY, BIOMART_URL};
    use crate::core::UnavailableError;
    use crate::formats::exon_table::ExonTable;
    use log::info;
    use std::fs::{self, File};
    use std::io::{self, BufWriter};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    /// Exon table downloaded from Ensembl BioMart and cached on disk
    ///
    /// `fetch` reuses the cache file when it exists unless `refresh` is set.
    #[derive(Debug, Clone)]
    pub struct BiomartReference {
        cache: LocalReference,
        url: String,
        timeout: Duration,
        refresh: bool,
    }

    impl BiomartReference {
        pub fn new<P: AsRef<Path>>(cache_path: P) -> Self {
            Self {
                cache: LocalReference::new(cache_path),
                url: BIOMART_URL.to_string(),
                timeout: Duration::from_secs(600),
                refresh: false,
            }
        }

        /// Use a different BioMart mirror
        pub fn with_url(mut self, url: impl Into<String>) -> Self {
            self.url = url.into();
            self
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        /// Download even if the cache file exists
        pub fn with_refresh(mut self, refresh: bool) -> Self {
            self.refresh = refresh;
            self
        }

        pub fn cache_path(&self) -> &Path {
            self.cache.path()
        }

        fn download_error(&self, message: impl ToString) -> UnavailableError {
            UnavailableError::Download {
                url: self.url.clone(),
                message: message.to_string(),
            }
        }

        /// Download the exon export into the cache file
        pub fn download(&self) -> Result<PathBuf, UnavailableError> {
            let path = self.cache.path().to_path_buf();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }

            info!("Downloading Ensembl exon positions to {}", path.display());
            let client = reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| self.download_error(e))?;
            let mut response = client
                .get(&self.url)
                .query(&[("query", BIOMART_EXON_QUERY)])
                .send()
                .map_err(|e| self.download_error(e))?;
            if !response.status().is_success() {
                return Err(self.download_error(format!("HTTP {}", response.status())));
            }

            // Write to a sibling file so a failed transfer leaves no partial cache
            let partial = path.with_extension("part");
            {
                let mut writer = BufWriter::new(File::create(&partial)?);
                io::copy(&mut response, &mut writer)?;
            }
            fs::rename(&partial, &path)?;
            Ok(path)
        }
    }

    impl ReferenceDataProvider for BiomartReference {
        fn fetch(&self) -> Result<ExonTable, UnavailableError> {
            if self.refresh || !self.cache.path().is_file() {
                self.download()?;
            }
            self.cache.fetch()
        }
    }
}
