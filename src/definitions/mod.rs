//! @acp:module "Definition Store"
//! @acp:summary "Shared parameter definition file: parse, look up, create, save"
//! @acp:domain definitions
//! @acp:layer storage
//!
//! # Definition File Format
//!
//! Tab-separated records with `#` comment lines:
//!
//! ```text
//! *META   VERSION MINVERSION
//! META    2       1
//! *GROUP  ID      NAME
//! GROUP   1       Scripted
//! *PARAM  GUID    NAME    DATATYPE  DATACATEGORY  GROUP  VISIBLE  DESCRIPTION  USERMODIFIABLE  HIDEWHENNOVALUE
//! PARAM   <uuid>  Mark    TEXT                    1      1                     1               0
//! ```
//!
//! The file is opened once per operation that needs new bindings and is
//! only written back when something was added.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ParamError, Result};
use crate::model::SpecType;

const FILE_PREAMBLE: &str =
    "# This is a shared parameter file.\n# Do not edit manually.\n";

/// @acp:summary "A named parameter definition from the definition file"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDefinition {
    pub guid: Uuid,
    pub name: String,
    pub spec: SpecType,
    pub group_id: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub description: String,
}

fn default_visible() -> bool {
    true
}

/// @acp:summary "A definition group"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionGroup {
    pub id: u32,
    pub name: String,
}

/// @acp:summary "In-memory handle on a definition file"
#[derive(Debug, Clone)]
pub struct DefinitionFile {
    path: PathBuf,
    groups: Vec<DefinitionGroup>,
    definitions: Vec<ExternalDefinition>,
    dirty: bool,
}

impl DefinitionFile {
    /// @acp:summary "Open an existing definition file"
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParamError::DefinitionFile(format!(
                "definition file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let file = Self::parse(path, &content)?;
        debug!(
            path = %path.display(),
            groups = file.groups.len(),
            definitions = file.definitions.len(),
            "opened definition file"
        );
        Ok(file)
    }

    /// @acp:summary "Open the file, creating an empty one when allowed"
    pub fn open_or_create<P: AsRef<Path>>(path: P, create: bool) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() || !create {
            return Self::open(path);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = Self::empty(path);
        file.dirty = true;
        file.save()?;
        info!(path = %path.display(), "created definition file");
        Ok(file)
    }

    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            groups: Vec::new(),
            definitions: Vec::new(),
            dirty: false,
        }
    }

    /// @acp:summary "Parse definition file content"
    pub fn parse<P: AsRef<Path>>(path: P, content: &str) -> Result<Self> {
        let mut file = Self::empty(path);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .comment(Some(b'#'))
            .from_reader(content.as_bytes());

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = index + 1;
            let field = |i: usize| record.get(i).unwrap_or("").trim();

            match field(0) {
                "GROUP" => {
                    let id = parse_group_id(field(1), line)?;
                    file.groups.push(DefinitionGroup {
                        id,
                        name: field(2).to_string(),
                    });
                }
                "PARAM" => {
                    let guid = Uuid::parse_str(field(1)).map_err(|e| {
                        ParamError::DefinitionFile(format!("record {}: bad GUID: {}", line, e))
                    })?;
                    let spec = SpecType::from_token(field(3)).unwrap_or_default();
                    file.definitions.push(ExternalDefinition {
                        guid,
                        name: field(2).to_string(),
                        spec,
                        group_id: parse_group_id(field(5), line)?,
                        visible: field(6) != "0",
                        description: field(7).to_string(),
                    });
                }
                // Header rows, META and blank padding
                _ => {}
            }
        }

        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn groups(&self) -> &[DefinitionGroup] {
        &self.groups
    }

    pub fn definitions(&self) -> &[ExternalDefinition] {
        &self.definitions
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn group(&self, name: &str) -> Option<&DefinitionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// @acp:summary "Find a group by name or create it"
    pub fn ensure_group(&mut self, name: &str) -> u32 {
        if let Some(group) = self.group(name) {
            return group.id;
        }
        let id = self.groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        self.groups.push(DefinitionGroup {
            id,
            name: name.to_string(),
        });
        self.dirty = true;
        id
    }

    pub fn definition(&self, group_id: u32, name: &str) -> Option<&ExternalDefinition> {
        self.definitions
            .iter()
            .find(|d| d.group_id == group_id && d.name == name)
    }

    /// @acp:summary "Reuse the named definition in a group or create a new one"
    ///
    /// An existing definition keeps its own spec type even when a different
    /// one is requested.
    pub fn find_or_create(&mut self, group: &str, name: &str, spec: SpecType) -> ExternalDefinition {
        let group_id = self.ensure_group(group);
        if let Some(existing) = self.definition(group_id, name) {
            return existing.clone();
        }
        let definition = ExternalDefinition {
            guid: Uuid::new_v4(),
            name: name.to_string(),
            spec,
            group_id,
            visible: true,
            description: String::new(),
        };
        debug!(name, group, spec = spec.label(), "created definition");
        self.definitions.push(definition.clone());
        self.dirty = true;
        definition
    }

    /// @acp:summary "Render the file content"
    pub fn render(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());

        writer.write_record(["*META", "VERSION", "MINVERSION"])?;
        writer.write_record(["META", "2", "1"])?;
        writer.write_record(["*GROUP", "ID", "NAME"])?;
        for group in &self.groups {
            writer.write_record([String::from("GROUP"), group.id.to_string(), group.name.clone()])?;
        }
        writer.write_record([
            "*PARAM",
            "GUID",
            "NAME",
            "DATATYPE",
            "DATACATEGORY",
            "GROUP",
            "VISIBLE",
            "DESCRIPTION",
            "USERMODIFIABLE",
            "HIDEWHENNOVALUE",
        ])?;
        for def in &self.definitions {
            writer.write_record([
                String::from("PARAM"),
                def.guid.to_string(),
                def.name.clone(),
                def.spec.token().to_string(),
                String::new(),
                def.group_id.to_string(),
                if def.visible { "1" } else { "0" }.to_string(),
                def.description.clone(),
                String::from("1"),
                String::from("0"),
            ])?;
        }

        let body = writer
            .into_inner()
            .map_err(|e| ParamError::DefinitionFile(e.to_string()))?;
        Ok(format!("{}{}", FILE_PREAMBLE, String::from_utf8_lossy(&body)))
    }

    /// @acp:summary "Write the file back to disk"
    pub fn save(&mut self) -> Result<()> {
        std::fs::write(&self.path, self.render()?)?;
        self.dirty = false;
        Ok(())
    }

    /// Save only when definitions or groups were added
    pub fn save_if_dirty(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        info!(path = %self.path.display(), "saved definition file");
        Ok(true)
    }
}

fn parse_group_id(field: &str, line: usize) -> Result<u32> {
    field.parse::<u32>().map_err(|_| {
        ParamError::DefinitionFile(format!("record {}: bad group id '{}'", line, field))
    })
}

/// @acp:summary "Definition file opened on first use, at most once"
#[derive(Debug)]
pub struct LazyDefinitionFile {
    path: PathBuf,
    create: bool,
    file: Option<DefinitionFile>,
}

impl LazyDefinitionFile {
    pub fn new<P: AsRef<Path>>(path: P, create: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            create,
            file: None,
        }
    }

    pub fn get(&mut self) -> Result<&mut DefinitionFile> {
        if self.file.is_none() {
            self.file = Some(DefinitionFile::open_or_create(&self.path, self.create)?);
        }
        self.file
            .as_mut()
            .ok_or_else(|| ParamError::DefinitionFile("definition file unavailable".into()))
    }

    pub fn into_inner(self) -> Option<DefinitionFile> {
        self.file
    }
}
