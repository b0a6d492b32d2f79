use super::LanguageId;

/// Anonymous grammar tokens shown as keywords.
pub(super) fn is_keyword(language: LanguageId, kind: &str) -> bool {
    match language {
        LanguageId::Rust => is_rust_keyword(kind),
        LanguageId::Go => is_go_keyword(kind),
        LanguageId::Python => is_python_keyword(kind),
        LanguageId::C => is_c_keyword(kind),
        LanguageId::Cpp => is_c_keyword(kind) || is_cpp_keyword(kind),
        LanguageId::Java => is_java_keyword(kind),
        LanguageId::JavaScript | LanguageId::TypeScript | LanguageId::Tsx => {
            is_js_ts_keyword(kind)
        }
        LanguageId::Json | LanguageId::Yaml => matches!(kind, "true" | "false" | "null"),
        LanguageId::Toml => matches!(kind, "true" | "false"),
        LanguageId::Css => matches!(kind, "!important" | "@media" | "@import" | "@keyframes"),
        LanguageId::Bash => is_bash_keyword(kind),
        LanguageId::Html => false,
    }
}

fn is_rust_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
    )
}

fn is_go_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

fn is_python_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "and"
            | "as"
            | "assert"
            | "async"
            | "await"
            | "break"
            | "case"
            | "class"
            | "continue"
            | "def"
            | "del"
            | "elif"
            | "else"
            | "except"
            | "finally"
            | "for"
            | "from"
            | "global"
            | "if"
            | "import"
            | "in"
            | "is"
            | "lambda"
            | "match"
            | "nonlocal"
            | "not"
            | "or"
            | "pass"
            | "raise"
            | "return"
            | "try"
            | "while"
            | "with"
            | "yield"
    )
}

fn is_c_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "break"
            | "case"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "else"
            | "enum"
            | "extern"
            | "for"
            | "goto"
            | "if"
            | "inline"
            | "register"
            | "return"
            | "sizeof"
            | "static"
            | "struct"
            | "switch"
            | "typedef"
            | "union"
            | "volatile"
            | "while"
            | "#include"
            | "#define"
            | "#ifdef"
            | "#ifndef"
            | "#if"
            | "#else"
            | "#endif"
    )
}

fn is_cpp_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "class"
            | "constexpr"
            | "delete"
            | "explicit"
            | "friend"
            | "namespace"
            | "new"
            | "noexcept"
            | "operator"
            | "override"
            | "private"
            | "protected"
            | "public"
            | "template"
            | "throw"
            | "try"
            | "catch"
            | "typename"
            | "using"
            | "virtual"
    )
}

fn is_java_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "abstract"
            | "break"
            | "case"
            | "catch"
            | "class"
            | "continue"
            | "default"
            | "do"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "for"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "interface"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "static"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "try"
            | "void"
            | "while"
    )
}

fn is_js_ts_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "as" | "async"
            | "await"
            | "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "export"
            | "extends"
            | "finally"
            | "for"
            | "from"
            | "function"
            | "if"
            | "implements"
            | "import"
            | "in"
            | "instanceof"
            | "interface"
            | "let"
            | "new"
            | "of"
            | "private"
            | "protected"
            | "public"
            | "readonly"
            | "return"
            | "static"
            | "switch"
            | "throw"
            | "try"
            | "type"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
            | "yield"
    )
}

fn is_bash_keyword(kind: &str) -> bool {
    matches!(
        kind,
        "if" | "then"
            | "else"
            | "elif"
            | "fi"
            | "case"
            | "esac"
            | "for"
            | "while"
            | "until"
            | "do"
            | "done"
            | "in"
            | "function"
            | "select"
            | "local"
            | "declare"
            | "export"
            | "readonly"
            | "unset"
    )
}
