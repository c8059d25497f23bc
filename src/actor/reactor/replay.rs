use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
#[cfg(test)]
use tempfile::NamedTempFile;
use tracing::warn;

use super::Event;
use crate::common::config::Config;

/// Writes every handled event to a file, one RON value per line, after a
/// header line holding the config.
pub struct Record {
    file: Option<File>,
    #[cfg(test)]
    temp: Option<NamedTempFile>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = path
            .map(|path| {
                File::create(path).with_context(|| format!("creating record {}", path.display()))
            })
            .transpose()?;
        Ok(Self {
            file,
            #[cfg(test)]
            temp: None,
        })
    }

    pub fn none() -> Self {
        Self {
            file: None,
            #[cfg(test)]
            temp: None,
        }
    }

    #[cfg(test)]
    pub fn new_for_test(temp: NamedTempFile) -> Self {
        Self { file: None, temp: Some(temp) }
    }

    fn file(&mut self) -> Option<&mut File> {
        #[cfg(test)]
        return self.file.as_mut().or(self.temp.as_mut().map(|temp| temp.as_file_mut()));
        #[cfg(not(test))]
        self.file.as_mut()
    }

    pub(super) fn start(&mut self, config: &Config) {
        let Some(file) = self.file() else { return };
        let result = ron::ser::to_string(config)
            .map_err(anyhow::Error::from)
            .and_then(|config| Ok(writeln!(file, "{config}")?));
        if let Err(e) = result {
            warn!("Could not write record header: {e}");
            self.file = None;
        }
    }

    pub(super) fn on_event(&mut self, event: &Event) {
        let Some(file) = self.file() else { return };
        let result = ron::ser::to_string(event)
            .map_err(anyhow::Error::from)
            .and_then(|line| Ok(writeln!(file, "{line}")?));
        if let Err(e) = result {
            warn!(?event, "Could not record event: {e}");
        }
    }
}

/// Reads a record back: the config it was made with and its events.
pub fn read_record(path: &Path) -> anyhow::Result<(Config, Vec<Event>)> {
    let file = BufReader::new(
        File::open(path).with_context(|| format!("opening record {}", path.display()))?,
    );
    let mut lines = file.lines();
    let header = lines.next().context("empty record")??;
    let config = ron::de::from_str(&header)?;
    let events = lines
        .map(|line| Ok(ron::de::from_str(&line?)?))
        .collect::<anyhow::Result<Vec<Event>>>()?;
    Ok((config, events))
}
