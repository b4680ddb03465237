/// Best-effort language name for a changed file, used as a hint in prompts.
pub fn detect_language(path: &str) -> Option<&'static str> {
    let file_name = path.rsplit('/').next().unwrap_or(path).to_lowercase();

    if file_name == "dockerfile" || file_name.starts_with("dockerfile.") {
        return Some("Dockerfile");
    }
    if file_name == "makefile" || file_name == "gnumakefile" {
        return Some("Makefile");
    }
    if file_name == "cmakelists.txt" {
        return Some("CMake");
    }
    if file_name.ends_with(".d.ts") {
        return Some("TypeScript");
    }

    let (_, extension) = file_name.rsplit_once('.')?;

    let language = match extension {
        "rs" => "Rust",
        "py" | "pyw" | "pyx" => "Python",
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        "ts" | "tsx" | "mts" | "cts" => "TypeScript",
        "go" => "Go",
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "scala" => "Scala",
        "c" | "h" => "C",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" => "C++",
        "cs" => "C#",
        "swift" => "Swift",
        "m" => "Objective-C",
        "rb" | "rake" => "Ruby",
        "php" => "PHP",
        "ex" | "exs" => "Elixir",
        "erl" => "Erlang",
        "hs" => "Haskell",
        "sh" | "bash" | "zsh" => "Shell",
        "ps1" | "psm1" => "PowerShell",
        "html" | "htm" => "HTML",
        "css" | "scss" | "sass" | "less" => "CSS",
        "vue" => "Vue",
        "svelte" => "Svelte",
        "sql" => "SQL",
        "graphql" | "gql" => "GraphQL",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "xml" => "XML",
        "lua" => "Lua",
        "dart" => "Dart",
        "sol" => "Solidity",
        "proto" => "Protocol Buffers",
        "tf" | "tfvars" => "Terraform",
        _ => return None,
    };

    Some(language)
}
