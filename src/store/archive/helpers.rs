// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDataJson {
    #[serde(default)]
    individuals: Vec<IndividualJson>,
    #[serde(default)]
    families: Vec<FamilyJson>,
    #[serde(default)]
    tags: Vec<TagJson>,
    #[serde(default)]
    sources: Vec<SourceJson>,
    #[serde(default)]
    relationships: Vec<RelationshipJson>,
    #[serde(default)]
    viewport: Option<ViewportJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndividualJson {
    id: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gender: Option<GenderJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    death_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<EventJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tag_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    media: Vec<MediaJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    citations: Vec<CitationJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyJson {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    husband_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wife_id: Option<String>,
    #[serde(default)]
    child_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<EventJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tag_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    media: Vec<MediaJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    citations: Vec<CitationJson>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum GenderJson {
    Male,
    Female,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventJson {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    citations: Vec<CitationJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CitationJson {
    source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaJson {
    id: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagJson {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceJson {
    id: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum RelationshipKindJson {
    ParentChild,
    Spouse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipJson {
    kind: RelationshipKindJson,
    from: String,
    to: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportJson {
    #[serde(default)]
    pan_x: f64,
    #[serde(default)]
    pan_y: f64,
    #[serde(default = "default_scale")]
    scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectLayoutJson {
    #[serde(default = "default_scale")]
    zoom: f64,
    #[serde(default)]
    view_origin: PointJson,
    #[serde(default)]
    positions: BTreeMap<String, PointJson>,
    #[serde(default)]
    positions_are_centers: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PointJson {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectMetadataJson {
    #[serde(default)]
    name: String,
    #[serde(default)]
    created_at: Option<TimestampJson>,
    #[serde(default)]
    modified_at: Option<TimestampJson>,
    #[serde(default)]
    format_version: u32,
}

/// Integer milliseconds, or fractional seconds as written by older archives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum TimestampJson {
    Millis(i64),
    Seconds(f64),
}

impl TimestampJson {
    fn to_millis(self) -> i64 {
        match self {
            Self::Millis(millis) => millis,
            Self::Seconds(seconds) => (seconds * 1000.0).round() as i64,
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

fn parse_id<T>(field: &'static str, value: String) -> Result<Id<T>, PayloadError> {
    Id::new(value.clone()).map_err(|source| PayloadError::InvalidId { field, value, source })
}

fn parse_ids<T>(field: &'static str, values: Vec<String>) -> Result<Vec<Id<T>>, PayloadError> {
    values.into_iter().map(|value| parse_id(field, value)).collect()
}

fn data_to_json(data: &ProjectData) -> ProjectDataJson {
    ProjectDataJson {
        individuals: data.individuals().values().map(individual_to_json).collect(),
        families: data.families().values().map(family_to_json).collect(),
        tags: data
            .tags()
            .values()
            .map(|tag| TagJson {
                id: tag.tag_id().to_string(),
                name: tag.name().to_owned(),
                color: tag.color().map(str::to_owned),
            })
            .collect(),
        sources: data
            .sources()
            .values()
            .map(|source| SourceJson {
                id: source.source_id().to_string(),
                title: source.title().to_owned(),
                author: source.author().map(str::to_owned),
                notes: source.notes().map(str::to_owned),
            })
            .collect(),
        relationships: data
            .relationships()
            .iter()
            .map(|relationship| RelationshipJson {
                kind: match relationship.kind() {
                    RelationshipKind::ParentChild => RelationshipKindJson::ParentChild,
                    RelationshipKind::Spouse => RelationshipKindJson::Spouse,
                },
                from: relationship.from().to_string(),
                to: relationship.to().to_string(),
            })
            .collect(),
        viewport: {
            let viewport = data.viewport();
            Some(ViewportJson {
                pan_x: viewport.pan_x,
                pan_y: viewport.pan_y,
                scale: viewport.scale,
            })
        },
    }
}

fn individual_to_json(individual: &Individual) -> IndividualJson {
    IndividualJson {
        id: individual.individual_id().to_string(),
        first_name: individual.first_name().to_owned(),
        last_name: individual.last_name().to_owned(),
        gender: individual.gender().map(|gender| match gender {
            Gender::Male => GenderJson::Male,
            Gender::Female => GenderJson::Female,
            Gender::Unknown => GenderJson::Unknown,
        }),
        birth_year: individual.birth_year(),
        death_year: individual.death_year(),
        events: individual.events().iter().map(event_to_json).collect(),
        tag_ids: individual.tag_ids().iter().map(ToString::to_string).collect(),
        media: individual.media().iter().map(media_to_json).collect(),
        citations: citations_to_json(individual.citations()),
    }
}

fn family_to_json(family: &Family) -> FamilyJson {
    FamilyJson {
        id: family.family_id().to_string(),
        husband_id: family.husband_id().map(ToString::to_string),
        wife_id: family.wife_id().map(ToString::to_string),
        child_ids: family.child_ids().iter().map(ToString::to_string).collect(),
        events: family.events().iter().map(event_to_json).collect(),
        tag_ids: family.tag_ids().iter().map(ToString::to_string).collect(),
        media: family.media().iter().map(media_to_json).collect(),
        citations: citations_to_json(family.citations()),
    }
}

fn event_to_json(event: &LifeEvent) -> EventJson {
    EventJson {
        kind: event.kind().to_owned(),
        date: event.date().map(str::to_owned),
        place: event.place().map(str::to_owned),
        notes: event.notes().map(str::to_owned),
        citations: citations_to_json(event.citations()),
    }
}

fn citations_to_json(citations: &[SourceCitation]) -> Vec<CitationJson> {
    citations
        .iter()
        .map(|citation| CitationJson {
            source_id: citation.source_id().to_string(),
            page: citation.page().map(str::to_owned),
        })
        .collect()
}

fn media_to_json(media: &MediaAttachment) -> MediaJson {
    MediaJson {
        id: media.media_id().to_string(),
        path: media.path().to_owned(),
        mime_type: media.mime_type().map(str::to_owned),
        caption: media.caption().map(str::to_owned),
    }
}

fn data_from_json(json: ProjectDataJson) -> Result<ProjectData, PayloadError> {
    let mut data = ProjectData::default();

    for individual in json.individuals {
        data.insert_individual(individual_from_json(individual)?)?;
    }
    for family in json.families {
        data.insert_family(family_from_json(family)?)?;
    }
    for tag in json.tags {
        let mut out = Tag::new(parse_id("tag id", tag.id)?, tag.name);
        out.set_color(tag.color);
        data.insert_tag(out)?;
    }
    for source in json.sources {
        let mut out = Source::new(parse_id("source id", source.id)?, source.title);
        out.set_author(source.author);
        out.set_notes(source.notes);
        data.insert_source(out)?;
    }

    let relationships = json
        .relationships
        .into_iter()
        .map(|relationship| {
            let kind = match relationship.kind {
                RelationshipKindJson::ParentChild => RelationshipKind::ParentChild,
                RelationshipKindJson::Spouse => RelationshipKind::Spouse,
            };
            Ok(Relationship::new(
                kind,
                parse_id("relationship from", relationship.from)?,
                parse_id("relationship to", relationship.to)?,
            ))
        })
        .collect::<Result<Vec<_>, PayloadError>>()?;
    data.set_relationships(relationships);

    if let Some(viewport) = json.viewport {
        data.set_viewport(Viewport {
            pan_x: viewport.pan_x,
            pan_y: viewport.pan_y,
            scale: viewport.scale,
        });
    }
    Ok(data)
}

fn individual_from_json(json: IndividualJson) -> Result<Individual, PayloadError> {
    let individual_id = parse_id("individual id", json.id)?;
    let mut individual = Individual::new(individual_id, json.first_name, json.last_name);
    individual.set_gender(json.gender.map(|gender| match gender {
        GenderJson::Male => Gender::Male,
        GenderJson::Female => Gender::Female,
        GenderJson::Unknown => Gender::Unknown,
    }));
    individual.set_birth_year(json.birth_year);
    individual.set_death_year(json.death_year);
    *individual.events_mut() = events_from_json(json.events)?;
    *individual.tag_ids_mut() = parse_ids("tag id", json.tag_ids)?;
    *individual.media_mut() = media_from_json(json.media)?;
    *individual.citations_mut() = citations_from_json(json.citations)?;
    Ok(individual)
}

fn family_from_json(json: FamilyJson) -> Result<Family, PayloadError> {
    let husband_id = json.husband_id.map(|id| parse_id("husband id", id)).transpose()?;
    let wife_id = json.wife_id.map(|id| parse_id("wife id", id)).transpose()?;
    let mut family = Family::with_spouses(parse_id("family id", json.id)?, husband_id, wife_id);
    *family.child_ids_mut() = parse_ids("child id", json.child_ids)?;
    *family.events_mut() = events_from_json(json.events)?;
    *family.tag_ids_mut() = parse_ids("tag id", json.tag_ids)?;
    *family.media_mut() = media_from_json(json.media)?;
    *family.citations_mut() = citations_from_json(json.citations)?;
    Ok(family)
}

fn events_from_json(events: Vec<EventJson>) -> Result<Vec<LifeEvent>, PayloadError> {
    events
        .into_iter()
        .map(|json| {
            let mut event = LifeEvent::new(json.kind);
            event.set_date(json.date);
            event.set_place(json.place);
            event.set_notes(json.notes);
            *event.citations_mut() = citations_from_json(json.citations)?;
            Ok(event)
        })
        .collect()
}

fn citations_from_json(citations: Vec<CitationJson>) -> Result<Vec<SourceCitation>, PayloadError> {
    citations
        .into_iter()
        .map(|json| {
            let source_id = parse_id("source id", json.source_id)?;
            Ok(match json.page {
                Some(page) => SourceCitation::with_page(source_id, page),
                None => SourceCitation::new(source_id),
            })
        })
        .collect()
}

fn media_from_json(media: Vec<MediaJson>) -> Result<Vec<MediaAttachment>, PayloadError> {
    media
        .into_iter()
        .map(|json| {
            let mut attachment = MediaAttachment::new(parse_id("media id", json.id)?, json.path);
            attachment.set_mime_type(json.mime_type);
            attachment.set_caption(json.caption);
            Ok(attachment)
        })
        .collect()
}

fn layout_to_json(layout: &ProjectLayout) -> ProjectLayoutJson {
    let origin = layout.view_origin();
    ProjectLayoutJson {
        zoom: layout.zoom(),
        view_origin: PointJson { x: origin.x, y: origin.y },
        positions: layout
            .positions()
            .iter()
            .map(|(node_id, point)| (node_id.to_string(), PointJson { x: point.x, y: point.y }))
            .collect(),
        positions_are_centers: layout.positions_are_centers(),
    }
}

fn layout_from_json(json: ProjectLayoutJson) -> Result<ProjectLayout, PayloadError> {
    let mut layout = ProjectLayout::default();
    layout.set_zoom(json.zoom);
    layout.set_view_origin(LayoutPoint::new(json.view_origin.x, json.view_origin.y));
    layout.set_positions_are_centers(json.positions_are_centers);
    for (node_id, point) in json.positions {
        let node_id: NodeId = parse_id("node id", node_id)?;
        layout.set_position(node_id, LayoutPoint::new(point.x, point.y));
    }
    Ok(layout)
}

fn meta_to_json(metadata: &ProjectMetadata) -> ProjectMetadataJson {
    ProjectMetadataJson {
        name: metadata.name().to_owned(),
        created_at: Some(TimestampJson::Millis(metadata.created_at())),
        modified_at: Some(TimestampJson::Millis(metadata.modified_at())),
        format_version: metadata.format_version(),
    }
}

fn meta_from_json(json: ProjectMetadataJson) -> Result<ProjectMetadata, PayloadError> {
    let created_at = json.created_at.map(TimestampJson::to_millis).unwrap_or(0);
    let modified_at = json.modified_at.map(TimestampJson::to_millis).unwrap_or(created_at);
    Ok(ProjectMetadata::from_parts(json.name, created_at, modified_at, json.format_version))
}
