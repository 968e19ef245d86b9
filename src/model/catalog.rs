//! @acp:module "Parameter Catalog"
//! @acp:summary "Disciplines, spec types, group labels, scopes and origins"
//! @acp:domain core
//! @acp:layer model
//!
//! Closed vocabularies used by the record builder, the definition file and
//! the spreadsheet bridge. Every `from_label` is lenient: unknown labels fall
//! back to a default instead of failing, so a hand-edited sheet still imports.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::StorageKind;

/// @acp:summary "Engineering discipline of a parameter definition"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    #[default]
    Common,
    Electrical,
    Energy,
    Hvac,
    Infrastructure,
    Piping,
    Structural,
}

impl Discipline {
    pub const ALL: [Discipline; 7] = [
        Self::Common,
        Self::Electrical,
        Self::Energy,
        Self::Hvac,
        Self::Infrastructure,
        Self::Piping,
        Self::Structural,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Electrical => "Electrical",
            Self::Energy => "Energy",
            Self::Hvac => "HVAC",
            Self::Infrastructure => "Infrastructure",
            Self::Piping => "Piping",
            Self::Structural => "Structural",
        }
    }

    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// @acp:summary "Data type of a shared parameter definition"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecType {
    Angle,
    Area,
    Cost,
    Count,
    Distance,
    Force,
    Image,
    Length,
    Material,
    MassDensity,
    Number,
    Percentage,
    Slope,
    #[default]
    Text,
    Time,
    Url,
    Volume,
    YesNo,
    Currency,
    Speed,
    RotationAngle,
    FillPattern,
    MultilineText,
    FamilyType,
}

impl SpecType {
    pub const ALL: [SpecType; 24] = [
        Self::Angle,
        Self::Area,
        Self::Cost,
        Self::Count,
        Self::Distance,
        Self::Force,
        Self::Image,
        Self::Length,
        Self::Material,
        Self::MassDensity,
        Self::Number,
        Self::Percentage,
        Self::Slope,
        Self::Text,
        Self::Time,
        Self::Url,
        Self::Volume,
        Self::YesNo,
        Self::Currency,
        Self::Speed,
        Self::RotationAngle,
        Self::FillPattern,
        Self::MultilineText,
        Self::FamilyType,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Angle => "Angle",
            Self::Area => "Area",
            Self::Cost => "Cost",
            Self::Count => "Count",
            Self::Distance => "Distance",
            Self::Force => "Force",
            Self::Image => "Image",
            Self::Length => "Length",
            Self::Material => "Material",
            Self::MassDensity => "Mass Density",
            Self::Number => "Number",
            Self::Percentage => "Percentage",
            Self::Slope => "Slope",
            Self::Text => "Text",
            Self::Time => "Time",
            Self::Url => "URL",
            Self::Volume => "Volume",
            Self::YesNo => "Yes/No",
            Self::Currency => "Currency",
            Self::Speed => "Speed",
            Self::RotationAngle => "Rotation Angle",
            Self::FillPattern => "Fill Pattern",
            Self::MultilineText => "Multiline Text",
            Self::FamilyType => "Family Type",
        }
    }

    /// Token written to the DATATYPE column of the definition file
    pub fn token(&self) -> &'static str {
        match self {
            Self::Angle => "ANGLE",
            Self::Area => "AREA",
            Self::Cost => "CURRENCY",
            Self::Count => "INTEGER",
            Self::Distance => "LENGTH",
            Self::Force => "FORCE",
            Self::Image => "IMAGE",
            Self::Length => "LENGTH",
            Self::Material => "MATERIAL",
            Self::MassDensity => "MASS_DENSITY",
            Self::Number => "NUMBER",
            Self::Percentage => "PERCENTAGE",
            Self::Slope => "SLOPE",
            Self::Text => "TEXT",
            Self::Time => "TIME",
            Self::Url => "URL",
            Self::Volume => "VOLUME",
            Self::YesNo => "YESNO",
            Self::Currency => "CURRENCY",
            Self::Speed => "SPEED",
            Self::RotationAngle => "ANGLE",
            Self::FillPattern => "FILL_PATTERN",
            Self::MultilineText => "MULTILINETEXT",
            Self::FamilyType => "FAMILYTYPE",
        }
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            Self::Text | Self::Url | Self::MultilineText => StorageKind::Text,
            Self::Count => StorageKind::Integer,
            Self::YesNo => StorageKind::Boolean,
            Self::Image | Self::Material | Self::FillPattern | Self::FamilyType => {
                StorageKind::Reference
            }
            _ => StorageKind::Number,
        }
    }

    /// Resolve a "Type/CD" label. Storage labels are accepted as aliases;
    /// anything unknown becomes Text.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if let Some(spec) = Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
        {
            return spec;
        }
        match label.to_ascii_lowercase().as_str() {
            "integer" => Self::Count,
            "yesno" | "boolean" => Self::YesNo,
            _ => Self::Text,
        }
    }

    /// Resolve a DATATYPE token. Aliased labels (Distance, Cost, Rotation
    /// Angle) share a token with their canonical spec and never win.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .filter(|s| !matches!(s, Self::Distance | Self::Cost | Self::RotationAngle))
            .find(|s| s.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for SpecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Group label used when nothing better is known
pub const DEFAULT_GROUP: &str = "Other";

/// Parameter group labels in display order
pub const GROUP_LABELS: &[&str] = &[
    "Analysis Results",
    "Analytical Alignment",
    "Analytical Model",
    "Constraints",
    "Construction",
    "Data",
    "Dimensions",
    "Division Geometry",
    "Electrical",
    "Electrical - Circuiting",
    "Electrical - Lighting",
    "Electrical - Loads",
    "Electrical Engineering",
    "Energy Analysis",
    "Fire Protection",
    "Forces",
    "General",
    "Graphics",
    "Green Building Properties",
    "Identity Data",
    "IFC Parameters",
    "Layers",
    "Materials and Finishes",
    "Mechanical",
    "Mechanical - Flow",
    "Mechanical - Loads",
    "Model Properties",
    "Moments",
    "Other",
    "Overall Legend",
    "Phasing",
    "Photometrics",
    "Plumbing",
    "Primary End",
    "Rebar Set",
    "Releases / Member Forces",
    "Secondary End",
    "Segments and Fittings",
    "Set",
    "Slab Shape Edit",
    "Structural",
    "Structural Analysis",
    "Text",
    "Title Text",
    "Visibility",
];

/// Normalize a group label to its canonical spelling, or "Other"
pub fn group_label(label: &str) -> &'static str {
    let label = label.trim();
    GROUP_LABELS
        .iter()
        .copied()
        .find(|g| g.eq_ignore_ascii_case(label))
        .unwrap_or(DEFAULT_GROUP)
}

/// @acp:summary "Whether a parameter lives on the element or on its type"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Instance,
    Type,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Instance => "Instance",
            Self::Type => "Type",
        }
    }

    /// Anything starting with "inst" binds as Instance, everything else as Type
    pub fn from_label(label: &str) -> Self {
        if label.trim().to_ascii_lowercase().starts_with("inst") {
            Self::Instance
        } else {
            Self::Type
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// @acp:summary "Where a parameter definition comes from"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterOrigin {
    #[default]
    BuiltIn,
    Shared,
    Project,
}

impl ParameterOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BuiltIn => "Built-in Parameter",
            Self::Shared => "Shared Parameter",
            Self::Project => "Project Parameter",
        }
    }

    /// Shared and project parameters come from a binding and can be removed
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Shared | Self::Project)
    }
}

impl fmt::Display for ParameterOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
