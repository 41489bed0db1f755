//! CSS property groups
//!
//! Groups follow the CSS reference categories (color, background, box model,
//! typography and so on). Vendor-prefixed properties belong to the group of
//! the unprefixed property.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Semantic category of a CSS property
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyGroup {
    Color,
    Background,
    Border,
    BasicBox,
    FlexibleBox,
    Text,
    TextDecoration,
    Font,
    Table,
    ListAndCounter,
    Animation,
    Transform,
    Transition,
    BasicUserInterface,
    MultiColumnLayout,
    PagedMedia,
    GeneratedContent,
    FilterEffect,
    ImageValueAndReplacedContent,
    Masking,
    Speech,
    Marquee,
}

fn vendor_prefix() -> Option<&'static Regex> {
    static PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
    PREFIX
        .get_or_init(|| Regex::new(r"^-(webkit|moz|ms|o)-").ok())
        .as_ref()
}

/// Group of a property, if it is a known one
pub fn group_of(property: &str) -> Option<PropertyGroup> {
    let name = property.to_ascii_lowercase();
    let name = match vendor_prefix() {
        Some(prefix) => prefix.replace(&name, "").into_owned(),
        None => name,
    };

    use PropertyGroup::*;
    let group = match name.as_str() {
        "color" | "opacity" => Color,

        "background" | "background-attachment" | "background-blend-mode" | "background-color"
        | "background-image" | "background-repeat" | "background-clip" | "background-origin"
        | "background-size" | "background-position" => Background,

        "border" | "border-bottom" | "border-bottom-color" | "border-bottom-left-radius"
        | "border-bottom-right-radius" | "border-bottom-style" | "border-bottom-width"
        | "border-color" | "border-image" | "border-image-outset" | "border-image-repeat"
        | "border-image-slice" | "border-image-source" | "border-image-width" | "border-left"
        | "border-left-color" | "border-left-style" | "border-left-width" | "border-radius"
        | "border-right" | "border-right-color" | "border-right-style" | "border-right-width"
        | "border-style" | "border-top" | "border-top-color" | "border-top-left-radius"
        | "border-top-right-radius" | "border-top-style" | "border-top-width"
        | "border-width" | "box-decoration-break" | "box-shadow" => Border,

        "bottom" | "clear" | "clip" | "display" | "float" | "height" | "left" | "margin"
        | "margin-bottom" | "margin-left" | "margin-right" | "margin-top" | "max-height"
        | "max-width" | "min-height" | "min-width" | "overflow" | "overflow-x"
        | "overflow-y" | "padding" | "padding-bottom" | "padding-left" | "padding-right"
        | "padding-top" | "position" | "right" | "top" | "visibility" | "width"
        | "vertical-align" | "z-index" => BasicBox,

        "align-content" | "align-items" | "align-self" | "flex" | "flex-basis"
        | "flex-direction" | "flex-flow" | "flex-grow" | "flex-shrink" | "flex-wrap"
        | "justify-content" | "order" => FlexibleBox,

        "hanging-punctuation" | "hyphens" | "letter-spacing" | "line-break" | "line-height"
        | "overflow-wrap" | "tab-size" | "text-align" | "text-align-last"
        | "text-combine-upright" | "text-indent" | "text-justify" | "text-transform"
        | "white-space" | "word-break" | "word-spacing" | "word-wrap" | "direction"
        | "text-orientation" | "unicode-bidi" | "writing-mode" => Text,

        "text-decoration" | "text-decoration-color" | "text-decoration-line"
        | "text-decoration-style" | "text-shadow" | "text-underline-position" => TextDecoration,

        "font" | "font-family" | "font-feature-settings" | "font-kerning"
        | "font-language-override" | "font-size" | "font-size-adjust" | "font-stretch"
        | "font-style" | "font-synthesis" | "font-variant" | "font-variant-alternates"
        | "font-variant-caps" | "font-variant-east-asian" | "font-variant-ligatures"
        | "font-variant-numeric" | "font-variant-position" | "font-weight" => Font,

        "border-collapse" | "border-spacing" | "caption-side" | "empty-cells"
        | "table-layout" => Table,

        "counter-increment" | "counter-reset" | "list-style" | "list-style-image"
        | "list-style-position" | "list-style-type" => ListAndCounter,

        "animation" | "animation-delay" | "animation-direction" | "animation-duration"
        | "animation-fill-mode" | "animation-iteration-count" | "animation-name"
        | "animation-play-state" | "animation-timing-function" => Animation,

        "backface-visibility" | "perspective" | "perspective-origin" | "transform"
        | "transform-origin" | "transform-style" => Transform,

        "transition" | "transition-property" | "transition-duration"
        | "transition-timing-function" | "transition-delay" => Transition,

        "box-sizing" | "content" | "cursor" | "ime-mode" | "nav-down" | "nav-index"
        | "nav-left" | "nav-right" | "nav-up" | "outline" | "outline-color"
        | "outline-offset" | "outline-style" | "outline-width" | "resize"
        | "text-overflow" => BasicUserInterface,

        "break-after" | "break-before" | "break-inside" | "column-count" | "column-fill"
        | "column-gap" | "column-rule" | "column-rule-color" | "column-rule-style"
        | "column-rule-width" | "column-span" | "column-width" | "columns"
        | "widows" => MultiColumnLayout,

        "orphans" | "page-break-after" | "page-break-before" | "page-break-inside" => {
            PagedMedia
        }

        "marks" | "quotes" => GeneratedContent,

        "filter" => FilterEffect,

        "image-orientation" | "image-rendering" | "image-resolution" | "object-fit"
        | "object-position" => ImageValueAndReplacedContent,

        "mask" | "mask-type" => Masking,

        "mark" | "mark-after" | "mark-before" | "phonemes" | "rest" | "rest-after"
        | "rest-before" | "voice-balance" | "voice-duration" | "voice-pitch"
        | "voice-pitch-range" | "voice-rate" | "voice-stress" | "voice-volume" => Speech,

        "marquee-direction" | "marquee-play-count" | "marquee-speed" | "marquee-style" => {
            Marquee
        }

        _ => return None,
    };
    Some(group)
}

/// True when every known property falls in one group
///
/// A single property always passes; unknown properties are ignored.
pub fn belong_to_same_group<'a>(properties: impl IntoIterator<Item = &'a str>) -> bool {
    let properties: BTreeSet<&str> = properties.into_iter().collect();
    if properties.len() == 1 {
        return true;
    }
    let groups: BTreeSet<PropertyGroup> = properties.into_iter().filter_map(group_of).collect();
    groups.len() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("color", Some(PropertyGroup::Color))]
    #[case("box-shadow", Some(PropertyGroup::Border))]
    #[case("border-bottom-left-radius", Some(PropertyGroup::Border))]
    #[case("overflow-y", Some(PropertyGroup::BasicBox))]
    #[case("-webkit-transition", Some(PropertyGroup::Transition))]
    #[case("-moz-border-radius", Some(PropertyGroup::Border))]
    #[case("zoom", None)]
    fn test_group_of(#[case] property: &str, #[case] expected: Option<PropertyGroup>) {
        assert_eq!(group_of(property), expected);
    }

    #[rstest]
    #[case(&["margin"], true)]
    #[case(&["zoom"], true)]
    #[case(&["margin", "padding", "width"], true)]
    #[case(&["margin", "zoom"], true)]
    #[case(&["margin", "color"], false)]
    #[case(&["font-size", "-webkit-font-smoothing", "line-height"], false)]
    #[case(&[], true)]
    fn test_belong_to_same_group(#[case] properties: &[&str], #[case] expected: bool) {
        assert_eq!(belong_to_same_group(properties.iter().copied()), expected);
    }
}
