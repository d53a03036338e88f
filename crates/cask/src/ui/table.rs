use cask_state::InstallationRecord;
use tabled::settings::object::Rows;
use tabled::settings::{Panel, Remove, Style};
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub header:   Option<String>,
    pub footer:   Option<String>,
    /// Drop the column-name row.
    pub no_names: bool,
}

impl Formatter {
    pub fn build<T: Tabled, I: IntoIterator<Item = T>>(self, data: I) -> Table {
        let mut table = Table::new(data);
        if self.no_names {
            table.with(Remove::row(Rows::first()));
        }
        if let Some(header) = self.header {
            table.with(Panel::header(header));
        }
        if let Some(footer) = self.footer {
            table.with(Panel::footer(footer));
        }

        table.with(Style::blank());
        table
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "NAME")]
    pub name:      String,
    #[tabled(rename = "VERSION")]
    pub version:   String,
    #[tabled(rename = "BINARIES")]
    pub binaries:  String,
    #[tabled(rename = "VERIFIED")]
    pub verified:  &'static str,
    #[tabled(rename = "INSTALLED")]
    pub installed: String,
}

impl From<&InstallationRecord> for RecordRow {
    fn from(record: &InstallationRecord) -> Self {
        let binaries = record
            .installed_paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: record.package_name.clone(),
            version: record.installed_version.clone(),
            binaries,
            verified: if record.integrity_checked { "sha256" } else { "no" },
            installed: record.install_timestamp.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}
