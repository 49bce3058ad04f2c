//! Operator identities and their classification.

/// The identity of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    None,
    Attr,
    CssClass,
    Id,
    Src,
    Href,
    Title,
    Value,
    Text,
    Html,
    Object,
    List,
    OList,
    Map,
    OMap,
    Numbering,
    Options,
    If,
    Exclude,
    Goto,
}

/// The group an [`Opcode`] belongs to.
///
/// An element carries at most one conditional and at most one content
/// operator, any number of attribute operators, and a jump overrides all of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    None,
    Jump,
    Conditional,
    Content,
    Attribute,
}

impl Opcode {
    /// Every opcode that has an operator, in declaration order.
    pub const ALL: [Opcode; 19] = [
        Opcode::Attr,
        Opcode::CssClass,
        Opcode::Id,
        Opcode::Src,
        Opcode::Href,
        Opcode::Title,
        Opcode::Value,
        Opcode::Text,
        Opcode::Html,
        Opcode::Object,
        Opcode::List,
        Opcode::OList,
        Opcode::Map,
        Opcode::OMap,
        Opcode::Numbering,
        Opcode::Options,
        Opcode::If,
        Opcode::Exclude,
        Opcode::Goto,
    ];

    /// Maps the kebab-case remainder of a directive name to an opcode.
    ///
    /// The name is upper-cased with hyphens turned into underscores and then
    /// matched against the opcode names.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_uppercase().replace('-', "_");
        match name.as_str() {
            "ATTR" => Self::Attr,
            "CSS_CLASS" => Self::CssClass,
            "ID" => Self::Id,
            "SRC" => Self::Src,
            "HREF" => Self::Href,
            "TITLE" => Self::Title,
            "VALUE" => Self::Value,
            "TEXT" => Self::Text,
            "HTML" => Self::Html,
            "OBJECT" => Self::Object,
            "LIST" => Self::List,
            "OLIST" => Self::OList,
            "MAP" => Self::Map,
            "OMAP" => Self::OMap,
            "NUMBERING" => Self::Numbering,
            "OPTIONS" => Self::Options,
            "IF" => Self::If,
            "EXCLUDE" => Self::Exclude,
            "GOTO" => Self::Goto,
            _ => Self::None,
        }
    }

    /// The kebab-case directive name.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Attr => "attr",
            Self::CssClass => "css-class",
            Self::Id => "id",
            Self::Src => "src",
            Self::Href => "href",
            Self::Title => "title",
            Self::Value => "value",
            Self::Text => "text",
            Self::Html => "html",
            Self::Object => "object",
            Self::List => "list",
            Self::OList => "olist",
            Self::Map => "map",
            Self::OMap => "omap",
            Self::Numbering => "numbering",
            Self::Options => "options",
            Self::If => "if",
            Self::Exclude => "exclude",
            Self::Goto => "goto",
        }
    }

    pub fn ty(self) -> Type {
        match self {
            Self::None => Type::None,
            Self::Goto => Type::Jump,
            Self::If | Self::Exclude => Type::Conditional,
            Self::Text
            | Self::Html
            | Self::Object
            | Self::List
            | Self::OList
            | Self::Map
            | Self::OMap
            | Self::Numbering
            | Self::Options => Type::Content,
            Self::Attr
            | Self::CssClass
            | Self::Id
            | Self::Src
            | Self::Href
            | Self::Title
            | Self::Value => Type::Attribute,
        }
    }

    /// Position of this opcode in [`Opcode::ALL`], `None` for [`Opcode::None`].
    pub fn index(self) -> Option<usize> {
        Self::ALL.iter().position(|op| *op == self)
    }
}
