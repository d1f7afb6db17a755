//! The snapshot: one deterministic, serializable record per parse.

pub mod assemble;
pub mod model;

pub use assemble::assemble;
pub use model::{
    AlignSpec, Blockquote, CodeBlock, CodeKind, CodeRange, Content, EncodingInfo, FootnoteDef,
    FootnoteRef, Footnotes, HtmlBlockRec, HtmlInlineRec, Image, ImageKind, LineType, Link,
    LinkKind, List, ListItem, ListType, Mappings, MathBlockRec, MathGroup, MathInlineRec,
    MathKind, Metadata, MetaFlag, Paragraph, Section, Security, SecurityStatistics, Snapshot,
    Structure, Table, Warning,
};
