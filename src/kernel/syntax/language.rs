use tree_sitter::Language;

/// Languages with a compiled-in tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    Rust,
    Go,
    Python,
    C,
    Cpp,
    Java,
    JavaScript,
    TypeScript,
    Tsx,
    Json,
    Yaml,
    Html,
    Css,
    Toml,
    Bash,
}

impl LanguageId {
    /// Resolves a fence info-string tag (`rust`, `py`, `sh`, ...). Matching is
    /// case-insensitive; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        Some(match tag.as_str() {
            "rust" | "rs" => Self::Rust,
            "go" | "golang" => Self::Go,
            "python" | "py" | "python3" | "pyi" => Self::Python,
            "c" | "h" => Self::C,
            "cpp" | "c++" | "cc" | "cxx" | "hpp" => Self::Cpp,
            "java" => Self::Java,
            "javascript" | "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "typescript" | "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            "json" | "jsonc" | "json5" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "html" | "htm" | "xhtml" => Self::Html,
            "css" => Self::Css,
            "toml" => Self::Toml,
            "bash" | "sh" | "shell" | "zsh" | "console" => Self::Bash,
            _ => return None,
        })
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Go => "Go",
            Self::Python => "Python",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Java => "Java",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Tsx => "TSX",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Toml => "TOML",
            Self::Bash => "Bash",
        }
    }

    pub(super) fn grammar(self) -> Language {
        match self {
            Self::Rust => tree_sitter_rust::language(),
            Self::Go => tree_sitter_go::language(),
            Self::Python => tree_sitter_python::language(),
            Self::C => tree_sitter_c::language(),
            Self::Cpp => tree_sitter_cpp::language(),
            Self::Java => tree_sitter_java::language(),
            Self::JavaScript => tree_sitter_javascript::language(),
            Self::TypeScript => tree_sitter_typescript::language_typescript(),
            Self::Tsx => tree_sitter_typescript::language_tsx(),
            Self::Json => tree_sitter_json::language(),
            Self::Yaml => tree_sitter_yaml::language(),
            Self::Html => tree_sitter_html::language(),
            Self::Css => tree_sitter_css::language(),
            Self::Toml => tree_sitter_toml::language(),
            Self::Bash => tree_sitter_bash::language(),
        }
    }
}
