//! Faceting resolver
//!
//! Reduces a materialized entity graph according to a [`FacetingDefinition`].
//! A definition with `populated == false` turns a populated entity into a
//! version reference. Fields without a nested definition default to
//! populated, so hydration continues unless explicitly cut off. References
//! are left as they are.
//!
//! The resolver never mutates its input.

use stadef_core::{
    ChannelData, ChannelGroupData, EntityData, FacetingDefinition, FacetingError, ResponseData, StationData,
    StationGroupData, Versioned, CHANNELS_KEY, CHANNEL_GROUPS_KEY, RESPONSE_KEY, STATIONS_KEY,
};

/// Entity payloads whose containment fields can be faceted.
pub trait Facetable: EntityData {
    /// Apply the nested definitions of `definition` to this payload's children.
    fn facet_fields(&self, definition: &FacetingDefinition) -> Result<Self, FacetingError>;
}

/// Reduce `entity` according to `definition`.
pub fn facet<D: Facetable>(
    entity: &Versioned<D>,
    definition: &FacetingDefinition,
) -> Result<Versioned<D>, FacetingError> {
    definition.check_class(D::KIND)?;

    let Some(data) = entity.data() else {
        return Ok(entity.clone());
    };

    if !definition.populated {
        return Ok(entity.to_version_reference());
    }

    Ok(Versioned {
        id: entity.id.clone(),
        effective_at: entity.effective_at,
        data: Some(data.facet_fields(definition)?),
    })
}

fn facet_field<D: Facetable>(
    children: &[Versioned<D>],
    parent: &FacetingDefinition,
    key: &str,
) -> Result<Vec<Versioned<D>>, FacetingError> {
    let definition = parent.field_or_default(key, D::KIND);
    children.iter().map(|child| facet(child, &definition)).collect()
}

impl Facetable for StationGroupData {
    fn facet_fields(&self, definition: &FacetingDefinition) -> Result<Self, FacetingError> {
        Ok(Self {
            stations: facet_field(&self.stations, definition, STATIONS_KEY)?,
            ..self.clone()
        })
    }
}

impl Facetable for StationData {
    fn facet_fields(&self, definition: &FacetingDefinition) -> Result<Self, FacetingError> {
        Ok(Self {
            channel_groups: facet_field(&self.channel_groups, definition, CHANNEL_GROUPS_KEY)?,
            all_raw_channels: facet_field(&self.all_raw_channels, definition, CHANNELS_KEY)?,
            ..self.clone()
        })
    }
}

impl Facetable for ChannelGroupData {
    fn facet_fields(&self, definition: &FacetingDefinition) -> Result<Self, FacetingError> {
        Ok(Self {
            channels: facet_field(&self.channels, definition, CHANNELS_KEY)?,
            ..self.clone()
        })
    }
}

impl Facetable for ChannelData {
    fn facet_fields(&self, definition: &FacetingDefinition) -> Result<Self, FacetingError> {
        let response = match &self.response {
            Some(response) => {
                let nested = definition.field_or_default(RESPONSE_KEY, ResponseData::KIND);
                Some(facet(response, &nested)?)
            }
            None => None,
        };
        Ok(Self {
            response,
            ..self.clone()
        })
    }
}

impl Facetable for ResponseData {
    fn facet_fields(&self, _definition: &FacetingDefinition) -> Result<Self, FacetingError> {
        Ok(self.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
