//! Static markup and scoped stylesheet of the overlay's render surface.
//!
//! Custom property names and `part` names are a public styling contract:
//! page authors restyle the overlay through them, so they never change.

/// Scoped stylesheet placed inside the render surface.
pub const STYLE: &str = r#"
:host {
  position: fixed;
  top: 0;
  left: 0;
  width: 100%;
  height: 100%;
  z-index: 99999;
  --monospace: 'SFMono-Regular', Consolas, 'Liberation Mono', Menlo, Courier, monospace;
  --red: #ff5555;
  --yellow: #e2aa53;
  --purple: #cfa4ff;
  --cyan: #2dd9da;
  --dim: #c9c9c9;
  --window-background: #181818;
  --window-color: #d8d8d8;
}

.backdrop {
  position: fixed;
  z-index: 99999;
  top: 0;
  left: 0;
  width: 100%;
  height: 100%;
  overflow-y: scroll;
  margin: 0;
  background: rgba(0, 0, 0, 0.66);
}

.window {
  font-family: var(--monospace);
  line-height: 1.5;
  max-width: 80vw;
  color: var(--window-color);
  box-sizing: border-box;
  margin: 30px auto;
  padding: 2.5vh 4vw;
  position: relative;
  background: var(--window-background);
  border-radius: 6px 6px 8px 8px;
  box-shadow: 0 19px 38px rgba(0, 0, 0, 0.30), 0 15px 12px rgba(0, 0, 0, 0.22);
  overflow: hidden;
  border-top: 8px solid var(--red);
  direction: ltr;
  text-align: left;
}

pre {
  font-family: var(--monospace);
  font-size: 16px;
  margin-top: 0;
  margin-bottom: 1em;
  overflow-x: scroll;
  scrollbar-width: none;
}

pre::-webkit-scrollbar {
  display: none;
}

pre.frame::-webkit-scrollbar {
  display: block;
  height: 5px;
}

.message {
  line-height: 1.3;
  font-weight: 600;
  white-space: pre-wrap;
}

.message-body {
  color: var(--red);
}

.plugin {
  color: var(--purple);
}

.file {
  color: var(--cyan);
  margin-bottom: 0;
  white-space: pre-wrap;
  word-break: break-all;
}

.frame {
  color: var(--yellow);
}

.stack {
  font-size: 13px;
  color: var(--dim);
}

.tip {
  font-size: 13px;
  color: #999;
  border-top: 1px dotted #999;
  padding-top: 13px;
  line-height: 1.8;
}

code {
  font-size: 13px;
  font-family: var(--monospace);
  color: var(--yellow);
}

.file-link {
  text-decoration: underline;
  cursor: pointer;
}
"#;

/// Backdrop, window panel, the five regions and the tip.
pub const BODY: &str = r#"
<div class="backdrop" part="backdrop">
  <div class="window" part="window">
    <pre class="message" part="message"><span class="plugin" part="plugin"></span><span class="message-body" part="message-body"></span></pre>
    <pre class="file" part="file"></pre>
    <pre class="frame" part="frame"></pre>
    <pre class="stack" part="stack"></pre>
    <div class="tip" part="tip">
      Click outside or fix the code to dismiss.<br>
      You can also disable this overlay by setting
      <code part="config-option-name">server.hmr.overlay</code>
      to
      <code part="config-option-value">false</code>
      in
      <code part="config-file-name">vite.config.js.</code>
    </div>
  </div>
</div>
"#;

/// Class carried by every activatable file link.
pub const LINK_CLASS: &str = "file-link";

/// Full render-surface markup: stylesheet followed by the body.
pub fn markup() -> String {
    format!("<style>{STYLE}</style>{BODY}")
}

/// Regions filled from the error descriptor, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Plugin,
    MessageBody,
    File,
    Frame,
    Stack,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Self::Plugin,
        Self::MessageBody,
        Self::File,
        Self::Frame,
        Self::Stack,
    ];

    /// Class and part name of the region's element.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::MessageBody => "message-body",
            Self::File => "file",
            Self::Frame => "frame",
            Self::Stack => "stack",
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            Self::Plugin => ".plugin",
            Self::MessageBody => ".message-body",
            Self::File => ".file",
            Self::Frame => ".frame",
            Self::Stack => ".stack",
        }
    }
}

/// Theme hooks exposed as custom properties on the host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeVariable {
    ErrorRed,
    WarnYellow,
    AccentPurple,
    InfoCyan,
    DimGray,
    PanelBackground,
    PanelForeground,
}

impl ThemeVariable {
    pub const ALL: [ThemeVariable; 7] = [
        Self::ErrorRed,
        Self::WarnYellow,
        Self::AccentPurple,
        Self::InfoCyan,
        Self::DimGray,
        Self::PanelBackground,
        Self::PanelForeground,
    ];

    pub fn property(self) -> &'static str {
        match self {
            Self::ErrorRed => "--red",
            Self::WarnYellow => "--yellow",
            Self::AccentPurple => "--purple",
            Self::InfoCyan => "--cyan",
            Self::DimGray => "--dim",
            Self::PanelBackground => "--window-background",
            Self::PanelForeground => "--window-color",
        }
    }
}

/// Every `part` name the markup exposes.
pub const PARTS: [&str; 12] = [
    "backdrop",
    "window",
    "message",
    "plugin",
    "message-body",
    "file",
    "frame",
    "stack",
    "tip",
    "config-option-name",
    "config-option-value",
    "config-file-name",
];
