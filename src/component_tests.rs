#[cfg(test)]
mod tests {
    use crate::component::{Attributes, ComponentBuilder, RegionSource, Tag};
    use crate::parse::scan_regions;
    use crate::validate::CompileError;

    fn build(source: &str) -> Result<ComponentBuilder, CompileError> {
        let mut builder = ComponentBuilder::new();
        for region in scan_regions(source)? {
            builder.add_region(&region)?;
        }
        Ok(builder)
    }

    #[test]
    fn test_add_region_classifies_scanned_regions() {
        let builder = build(
            "<template><p>x</p></template><script>export default {}</script>\
             <style>a{}</style><style scoped>b{}</style>",
        )
        .unwrap();
        let component = builder.build();

        assert_eq!(component.template().unwrap().contents, "<p>x</p>");
        assert_eq!(component.script().unwrap().contents_start_index, 37);
        assert_eq!(component.styles().len(), 2);
        assert!(component.styles()[1].attribs.is_truthy("scoped"));
    }

    #[test]
    fn test_duplicate_script_reported_at_second_tag() {
        let err = build("<script></script>\n<script></script>").unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateTag {
                tag_name: "script".to_string(),
                offset: 18,
            }
        );
        assert_eq!(err.to_string(), "Only one <script> allowed in component file");
    }

    #[test]
    fn test_unrecognized_tag_reported_at_tag_start() {
        let err = build("<style></style>\n<foo></foo>").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnrecognizedTag {
                tag_name: "foo".to_string(),
                offset: 16,
            }
        );
    }

    #[test]
    fn test_region_error_reanchored_to_document() {
        // `<!--` sits 8 bytes into contents that start at 10.
        let err = build("<template><p>a</p><!-- x</template>").unwrap_err();
        assert_eq!(err.offset(), Some(18));
        assert_eq!(err.tag_name(), Some("template"));
        assert!(matches!(err, CompileError::RegionParse { .. }));
    }

    #[test]
    fn test_unclosed_region_reanchored_to_document() {
        let err = build("<script>a()</script>\n<style>a{}").unwrap_err();
        assert_eq!(err.offset(), Some(31));
        assert_eq!(err.tag_name(), Some("style"));
    }

    struct FaultyRegion {
        attribs: Attributes,
    }

    impl RegionSource for FaultyRegion {
        fn tag_name(&self) -> &str {
            "template"
        }

        fn attribs(&self) -> &Attributes {
            &self.attribs
        }

        fn tag_start_index(&self) -> usize {
            100
        }

        fn contents_start_index(&self) -> usize {
            110
        }

        fn read_contents(&self) -> Result<String, CompileError> {
            Err(CompileError::RegionParse {
                tag_name: None,
                message: "bad markup".to_string(),
                offset: 4,
            })
        }
    }

    #[test]
    fn test_add_region_names_anonymous_region_errors() {
        let mut builder = ComponentBuilder::new();
        let region = FaultyRegion {
            attribs: Attributes::new(),
        };
        let err = builder.add_region(&region).unwrap_err();
        assert_eq!(
            err,
            CompileError::RegionParse {
                tag_name: Some("template".to_string()),
                message: "bad markup".to_string(),
                offset: 114,
            }
        );
        assert!(builder.component().template().is_none());
    }

    #[test]
    fn test_plain_tags_and_regions_share_classifier() {
        let mut builder = ComponentBuilder::new();
        builder
            .add_region(&Tag::new("template", "<p></p>").at(0, 10))
            .unwrap();
        let err = builder
            .classify(Tag::new("template", "").at(40, 50))
            .unwrap_err();
        assert_eq!(err.offset(), Some(40));
    }
}
