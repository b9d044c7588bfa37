use crate::descriptor::ErrorDescriptor;
use crate::template::Region;
use crate::text;
use crate::text::FileLocation;

/// Display text of each region, derived once from a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayContent {
    /// `[plugin:<name>] ` prefix.
    pub plugin: Option<String>,
    /// Message with inline code frames removed, trimmed.
    pub message: String,
    pub file: Option<FileLocation>,
    pub frame: Option<String>,
    pub stack: Option<String>,
}

impl OverlayContent {
    pub fn from_descriptor(descriptor: ErrorDescriptor) -> Self {
        let file = text::file_location(descriptor.loc.as_ref(), descriptor.id.as_deref());

        Self {
            plugin: descriptor
                .plugin
                .filter(|plugin| !plugin.is_empty())
                .map(|plugin| format!("[plugin:{plugin}] ")),
            message: text::strip_code_frame(&descriptor.message),
            file,
            frame: trimmed(descriptor.frame),
            stack: trimmed(descriptor.stack),
        }
    }

    /// Text shown in `region`; empty when the field was absent.
    pub fn text(&self, region: Region) -> &str {
        match region {
            Region::Plugin => self.plugin.as_deref().unwrap_or_default(),
            Region::MessageBody => &self.message,
            Region::File => self
                .file
                .as_ref()
                .map(|file| file.text.as_str())
                .unwrap_or_default(),
            Region::Frame => self.frame.as_deref().unwrap_or_default(),
            Region::Stack => self.stack.as_deref().unwrap_or_default(),
        }
    }
}

impl From<ErrorDescriptor> for OverlayContent {
    fn from(descriptor: ErrorDescriptor) -> Self {
        Self::from_descriptor(descriptor)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::OverlayContent;
    use crate::descriptor::ErrorDescriptor;
    use crate::descriptor::SourceLocation;
    use crate::template::Region;

    #[test]
    fn frame_region_is_independent_of_stripping() {
        let descriptor = ErrorDescriptor {
            message: "Unexpected token\n  12 | const x = 1\n     | ^\n".to_owned(),
            frame: Some("\n  12 | const x = 1\n     | ^\n".to_owned()),
            ..ErrorDescriptor::default()
        };
        let content = OverlayContent::from(descriptor);
        assert_eq!(content.text(Region::MessageBody), "Unexpected token");
        assert_eq!(content.text(Region::Frame), "12 | const x = 1\n     | ^");
    }

    #[test]
    fn absent_fields_leave_regions_empty() {
        let content = OverlayContent::from(ErrorDescriptor::new("boom"));
        for region in [Region::Plugin, Region::File, Region::Frame, Region::Stack] {
            assert_eq!(content.text(region), "");
        }
        assert_eq!(content.text(Region::MessageBody), "boom");
    }

    #[test]
    fn plugin_gets_prefix() {
        let descriptor = ErrorDescriptor {
            plugin: Some("vite:css".to_owned()),
            loc: Some(SourceLocation::new("/a/b.css?x=1", 3, 7)),
            ..ErrorDescriptor::new("x")
        };
        let content = OverlayContent::from(descriptor);
        assert_eq!(content.text(Region::Plugin), "[plugin:vite:css] ");
        assert_eq!(content.text(Region::File), "/a/b.css:3:7");
    }
}
