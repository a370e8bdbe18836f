use crate::blocks::{BlockSlot, BlockTree};
use crate::collection::Keyed;
use crate::design::Design;
use crate::error::{SectionsError, SectionsResult};
use crate::page::Page;
use crate::section::Section;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const MAX_SLUG_LENGTH: usize = 128;

/// Checks run before a page is saved. Only identities block a save: section
/// ids unique within the page, block ids unique within a section. Title and
/// slug problems are reported by [`page_warnings`].
pub fn validate_page(page: &Page) -> SectionsResult<()> {
    validate_section_ids(&page.content)?;
    for (index, section) in page.content.iter().enumerate() {
        validate_block_ids(section, index)?;
    }
    Ok(())
}

/// Lowercase words joined by `-`, optionally nested with `/`
pub fn validate_slug(slug: &str) -> SectionsResult<()> {
    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SLUG_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*(?:/[a-z0-9]+(?:-[a-z0-9]+)*)*$").expect("valid slug pattern")
    });

    if slug.is_empty() {
        return Err(SectionsError::InvalidSlug {
            slug: slug.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(SectionsError::InvalidSlug {
            slug: slug.to_string(),
            reason: format!("must be at most {} characters", MAX_SLUG_LENGTH),
        });
    }
    if !re.is_match(slug) {
        return Err(SectionsError::InvalidSlug {
            slug: slug.to_string(),
            reason: "must contain only lowercase letters, digits, '-' and '/'".to_string(),
        });
    }
    Ok(())
}

pub fn validate_section_ids(sections: &[Section]) -> SectionsResult<()> {
    let mut seen = HashSet::new();
    for section in sections {
        if let Some(id) = &section.id {
            let id = id.to_string();
            if !seen.insert(id.clone()) {
                return Err(SectionsError::DuplicateSectionId { id });
            }
        }
    }
    Ok(())
}

/// Block ids must be unique across all slots of one section
fn validate_block_ids(section: &Section, index: usize) -> SectionsResult<()> {
    let Some(hero) = section.content.as_hero() else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for slot in BlockSlot::ALL {
        for block in hero.slot(slot) {
            if let Some(id) = &block.id {
                let id = id.to_string();
                if !seen.insert(id.clone()) {
                    return Err(SectionsError::DuplicateBlockId {
                        section: section.key(index),
                        id,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Everything worth telling the editor that does not stop a save: a missing
/// title, a slug outside the usual format and the [`design_warnings`].
pub fn page_warnings(page: &Page) -> Vec<SectionsError> {
    let mut warnings = Vec::new();
    if page.title.trim().is_empty() {
        warnings.push(SectionsError::MissingTitle);
    }
    if let Err(err) = validate_slug(&page.slug) {
        warnings.push(err);
    }
    warnings.extend(design_warnings(page));
    warnings
}

/// Non-blocking design problems: colors that will resolve to white and
/// overlay opacities outside `[0, 1]`. Rendering still succeeds with these.
pub fn design_warnings(page: &Page) -> Vec<SectionsError> {
    let mut warnings = Vec::new();
    for section in &page.content {
        if let Some(design) = section.content.design() {
            check_design(design, &mut warnings);
        }
    }
    warnings
}

fn check_design(design: &Design, warnings: &mut Vec<SectionsError>) {
    static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let hex_regex = HEX_COLOR_REGEX
        .get_or_init(|| Regex::new(r"^#?[0-9a-fA-F]{6}$").expect("valid hex color pattern"));

    let colors = [
        ("background_color", &design.background_color),
        ("gradient_from", &design.gradient_from),
        ("gradient_to", &design.gradient_to),
        ("text_color", &design.text_color),
    ];
    for (property, value) in colors {
        if let Some(value) = value.as_deref().map(str::trim) {
            if !value.is_empty() && !hex_regex.is_match(value) {
                warnings.push(SectionsError::InvalidColor {
                    property: property.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    if let Some(opacity) = design.overlay_opacity {
        if !(0.0..=1.0).contains(&opacity) {
            warnings.push(SectionsError::ValueOutOfRange {
                property: "overlay_opacity".to_string(),
                value: opacity.to_string(),
                range: "0.0-1.0".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page(content: serde_json::Value) -> Page {
        serde_json::from_value(json!({
            "title": "Home",
            "slug": "home",
            "content": content
        }))
        .unwrap()
    }

    #[test]
    fn valid_page_passes() {
        let mut p = Page::new("Home", "services/web-design");
        p.content.push(Section::new(SectionKind::Hero));
        p.content.push(Section::new(SectionKind::Stats));
        assert!(validate_page(&p).is_ok());
    }

    #[test]
    fn title_and_slug_only_warn() {
        let p = Page::new("  ", "About_Us");
        assert_eq!(validate_page(&p), Ok(()));
        let warnings = page_warnings(&p);
        assert_eq!(warnings[0], SectionsError::MissingTitle);
        assert!(matches!(&warnings[1], SectionsError::InvalidSlug { slug, .. } if slug == "About_Us"));
        assert_eq!(warnings.len(), 2);

        assert_eq!(page_warnings(&Page::new("Home", "home")), Vec::new());
    }

    #[test]
    fn bad_slugs_are_rejected() {
        for slug in ["", "Home", "a b", "-lead", "trail-", "a//b", "x_y"] {
            assert!(validate_slug(slug).is_err(), "slug {:?} should be rejected", slug);
        }
        assert!(validate_slug("about-us").is_ok());
    }

    #[test]
    fn duplicate_section_ids_are_rejected() {
        let p = page(json!([
            { "id": 1, "type": "text", "data": {} },
            { "id": "1", "type": "quote", "data": {} }
        ]));
        assert_eq!(
            validate_page(&p),
            Err(SectionsError::DuplicateSectionId { id: "1".to_string() })
        );
    }

    #[test]
    fn sections_without_ids_are_allowed() {
        let p = page(json!([
            { "type": "text", "data": {} },
            { "type": "text", "data": {} }
        ]));
        assert!(validate_page(&p).is_ok());
    }

    #[test]
    fn duplicate_block_ids_across_slots_are_rejected() {
        let p = page(json!([{
            "id": "sec_1",
            "type": "hero",
            "data": {
                "left_blocks": [{ "id": "blk_a", "type": "heading", "content": {}, "style": {} }],
                "right_blocks": [{ "id": "blk_a", "type": "image", "content": {}, "style": {} }]
            }
        }]));
        assert_eq!(
            validate_page(&p),
            Err(SectionsError::DuplicateBlockId {
                section: "sec_1".to_string(),
                id: "blk_a".to_string()
            })
        );
    }

    #[test]
    fn design_warnings_report_colors_and_opacity() {
        let p = page(json!([{
            "type": "cta",
            "data": { "design": { "text_color": "tomato", "background_color": "", "overlay_opacity": 1.5 } }
        }]));
        assert_eq!(
            design_warnings(&p),
            vec![
                SectionsError::InvalidColor {
                    property: "text_color".to_string(),
                    value: "tomato".to_string()
                },
                SectionsError::ValueOutOfRange {
                    property: "overlay_opacity".to_string(),
                    value: "1.5".to_string(),
                    range: "0.0-1.0".to_string()
                },
            ]
        );
        assert!(validate_page(&p).is_ok());
    }
}
