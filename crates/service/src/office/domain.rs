use models::enums::LocationKind;
use models::office;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single place an office is attached to in the location hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfficeLocation {
    Ward(i32),
    Municipality(i32),
    District(i32),
    Province(i32),
}

impl OfficeLocation {
    /// Picks the most specific of the supplied ids; the others are ignored.
    pub fn most_specific(ward: Option<i32>, municipality: Option<i32>, district: Option<i32>, province: Option<i32>) -> Option<Self> {
        ward.map(Self::Ward)
            .or(municipality.map(Self::Municipality))
            .or(district.map(Self::District))
            .or(province.map(Self::Province))
    }

    pub fn from_parts(kind: Option<LocationKind>, id: Option<i32>) -> Option<Self> {
        Some(match (kind?, id?) {
            (LocationKind::Ward, id) => Self::Ward(id),
            (LocationKind::Municipality, id) => Self::Municipality(id),
            (LocationKind::District, id) => Self::District(id),
            (LocationKind::Province, id) => Self::Province(id),
        })
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Self::Ward(_) => LocationKind::Ward,
            Self::Municipality(_) => LocationKind::Municipality,
            Self::District(_) => LocationKind::District,
            Self::Province(_) => LocationKind::Province,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            Self::Ward(id) | Self::Municipality(id) | Self::District(id) | Self::Province(id) => id,
        }
    }
}

/// Input for `OfficeRegistry::create_office`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOffice {
    pub office_code: String,
    pub name: String,
    pub name_local: Option<String>,
    pub address: Option<String>,
    pub address_local: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category_id: Uuid,
    pub ward_id: Option<i32>,
    pub municipality_id: Option<i32>,
    pub district_id: Option<i32>,
    pub province_id: Option<i32>,
}

impl NewOffice {
    pub fn location(&self) -> Option<OfficeLocation> {
        OfficeLocation::most_specific(self.ward_id, self.municipality_id, self.district_id, self.province_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfficeUpdate {
    pub office_code: Option<String>,
    pub name: Option<String>,
    pub name_local: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub address_local: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub category_id: Option<Uuid>,
    /// `Some(None)` detaches the office from any location.
    pub location: Option<Option<OfficeLocation>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OfficeFilter {
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub id: i32,
    pub name: String,
    pub name_local: Option<String>,
}

/// Resolved location of an office, from its attachment point up to the province.
/// Levels above the attachment are always filled; levels below it are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationChain {
    pub ward_number: Option<i32>,
    pub municipality: Option<NamedLocation>,
    pub district: Option<NamedLocation>,
    pub province: NamedLocation,
}

impl LocationChain {
    /// `Ward 4, Kageshwori Manohara, Kathmandu, Bagmati`
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(n) = self.ward_number { parts.push(format!("Ward {n}")); }
        if let Some(m) = &self.municipality { parts.push(m.name.clone()); }
        if let Some(d) = &self.district { parts.push(d.name.clone()); }
        parts.push(self.province.name.clone());
        parts.join(", ")
    }

    /// Lower-cased strings an office search term may match: ward number, municipality and district names.
    pub fn search_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        if let Some(n) = self.ward_number { terms.push(n.to_string()); }
        for loc in [&self.municipality, &self.district].into_iter().flatten() {
            terms.push(loc.name.to_lowercase());
            if let Some(local) = &loc.name_local { terms.push(local.to_lowercase()); }
        }
        terms
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfficeView {
    pub office: office::Model,
    pub location: Option<LocationChain>,
    pub location_display: Option<String>,
}

impl OfficeView {
    pub fn new(office: office::Model, location: Option<LocationChain>) -> Self {
        let location_display = location.as_ref().map(LocationChain::display);
        Self { office, location, location_display }
    }

    /// Case-insensitive substring match against office fields and resolved location names.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() { return true; }
        let o = &self.office;
        let fields = [Some(&o.name), o.name_local.as_ref(), o.address.as_ref(), o.address_local.as_ref()];
        fields.into_iter().flatten().any(|f| f.to_lowercase().contains(&term))
            || self
                .location
                .as_ref()
                .map(|chain| chain.search_terms().iter().any(|t| t.contains(&term)))
                .unwrap_or(false)
    }
}
