//! # Artwork Catalog
//!
//! Read-only descriptive records for the six exhibited pieces. The core
//! only consults `id` and `mechanism`; the rest is carried for the
//! presentation layer.
//!
//! A valid catalog binds every mechanism to exactly one artwork, so
//! "is this artwork locked" and "is this mechanism solved" are the same
//! question.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::mechanism::MechanismId;

/// Slug identifying an artwork, e.g. `"lynch"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkId(pub String);

impl ArtworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// External links published with an artwork.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkLinks {
    pub website: Option<String>,
    pub portfolio: Option<String>,
    pub media: Option<String>,
}

/// A single exhibited artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    pub creator: String,
    pub year: u16,
    pub medium: String,
    /// The mechanism gating this artwork.
    pub mechanism: MechanismId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub links: ArtworkLinks,
}

/// A validated set of artworks, one per mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    artworks: Vec<Artwork>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and any mechanism that is
    /// unbound or bound twice.
    pub fn new(artworks: Vec<Artwork>) -> Result<Self, CatalogError> {
        let mut ids: HashSet<&ArtworkId> = HashSet::new();
        let mut bound: HashMap<MechanismId, &ArtworkId> = HashMap::new();

        for artwork in &artworks {
            if !ids.insert(&artwork.id) {
                return Err(CatalogError::DuplicateArtwork(artwork.id.to_string()));
            }
            if let Some(first) = bound.insert(artwork.mechanism, &artwork.id) {
                return Err(CatalogError::MechanismBoundTwice {
                    mechanism: artwork.mechanism.to_string(),
                    first: first.to_string(),
                    second: artwork.id.to_string(),
                });
            }
        }

        if let Some(missing) = MechanismId::all().iter().find(|m| !bound.contains_key(m)) {
            return Err(CatalogError::MechanismUnbound(missing.to_string()));
        }

        Ok(Self { artworks })
    }

    /// Parse a JSON array of artworks and validate it.
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let artworks: Vec<Artwork> =
            serde_json::from_str(s).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(artworks)
    }

    /// The six pieces of the exhibition.
    pub fn builtin() -> Self {
        let artworks = vec![
            builtin_artwork(
                "lynch",
                "Restoring a Name to Grate American Honor",
                "Garrett Lynch IRL",
                2025,
                "Chrome browser extension",
                MechanismId::Confirmshaming,
                "A browser extension that masks a renamed gulf with its original name.",
                Some("https://www.asquare.org/restoring-a-name-to-grate-american-honor/"),
            ),
            builtin_artwork(
                "weigel",
                "Interrogation",
                "Jennifer Weigel",
                2023,
                "Poetry",
                MechanismId::Autoplay,
                "A poem written in response to a police interrogation.",
                Some("https://jenniferweigelart.com/"),
            ),
            builtin_artwork(
                "gibbins",
                "ISOLATION PROCEDURES",
                "Ian Gibbins",
                2025,
                "Video",
                MechanismId::Timeout,
                "An imagined inner space navigating an authoritarian environment.",
                Some("https://vimeo.com/408259816"),
            ),
            builtin_artwork(
                "desire-engineering",
                "Starter Questions for 21st Century Grovelers",
                "desire_engineering",
                2025,
                "Memes",
                MechanismId::InfiniteScroll,
                "Ideas and hypotheses packaged as memes.",
                None,
            ),
            builtin_artwork(
                "perfect-users",
                "Perfect Censorship // Perfectly Unpublished",
                "Perfect Users",
                2025,
                "Collective image series",
                MechanismId::Surveillance,
                "Images remixed collectively in a private group chat.",
                None,
            ),
            builtin_artwork(
                "search-engine-scores",
                "Search Engine Scores",
                "Justice Alexander Hager",
                2025,
                "Generative score",
                MechanismId::Harmony,
                "Scores built from how search APIs fabricate evidence of demand.",
                None,
            ),
        ];

        Self { artworks }
    }

    pub fn get(&self, id: &ArtworkId) -> Option<&Artwork> {
        self.artworks.iter().find(|a| &a.id == id)
    }

    /// The artwork gated by `mechanism`. Always present in a valid catalog.
    pub fn by_mechanism(&self, mechanism: MechanismId) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.mechanism == mechanism)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artwork> {
        self.artworks.iter()
    }

    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn builtin_artwork(
    id: &str,
    title: &str,
    creator: &str,
    year: u16,
    medium: &str,
    mechanism: MechanismId,
    description: &str,
    portfolio: Option<&str>,
) -> Artwork {
    Artwork {
        id: ArtworkId::new(id),
        title: title.to_string(),
        creator: creator.to_string(),
        year,
        medium: medium.to_string(),
        mechanism,
        description: description.to_string(),
        links: ArtworkLinks {
            portfolio: portfolio.map(str::to_string),
            ..ArtworkLinks::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_passes_validation() {
        let builtin = Catalog::builtin();
        let rebuilt = Catalog::new(builtin.iter().cloned().collect()).unwrap();
        assert_eq!(rebuilt, builtin);
        assert_eq!(builtin.len(), 6);
    }

    #[test]
    fn test_every_mechanism_has_an_artwork() {
        let catalog = Catalog::builtin();
        for m in MechanismId::all() {
            assert_eq!(catalog.by_mechanism(*m).unwrap().mechanism, *m);
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = Catalog::builtin();
        let weigel = catalog.get(&ArtworkId::new("weigel")).unwrap();
        assert_eq!(weigel.mechanism, MechanismId::Autoplay);
        assert!(catalog.get(&ArtworkId::new("nobody")).is_none());
    }

    #[test]
    fn test_rejects_mechanism_bound_twice() {
        let mut artworks: Vec<Artwork> = Catalog::builtin().iter().cloned().collect();
        artworks[1].mechanism = MechanismId::Confirmshaming;
        let err = Catalog::new(artworks).unwrap_err();
        assert!(matches!(err, CatalogError::MechanismBoundTwice { .. }));
    }

    #[test]
    fn test_rejects_unbound_mechanism() {
        let mut artworks: Vec<Artwork> = Catalog::builtin().iter().cloned().collect();
        artworks.pop();
        assert_eq!(
            Catalog::new(artworks).unwrap_err(),
            CatalogError::MechanismUnbound("harmony".into())
        );
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let mut artworks: Vec<Artwork> = Catalog::builtin().iter().cloned().collect();
        artworks[5].id = ArtworkId::new("lynch");
        assert_eq!(
            Catalog::new(artworks).unwrap_err(),
            CatalogError::DuplicateArtwork("lynch".into())
        );
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::to_string(&Catalog::builtin().iter().collect::<Vec<_>>()).unwrap();
        let parsed = Catalog::from_json_str(&json).unwrap();
        assert_eq!(parsed, Catalog::builtin());
        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Parse(_))));
    }
}
