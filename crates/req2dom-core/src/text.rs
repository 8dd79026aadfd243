//! Small string helpers shared by the extraction stages.

const CONNECTORS: &[&str] = &["de", "da", "do", "das", "dos", "of", "the"];

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Lowercases and strips Latin diacritics: `"Descrição"` becomes `"descricao"`.
#[must_use]
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .collect()
}

#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Folds a multi-word phrase into a lower camel-case identifier, dropping
/// connectors: `"data de nascimento"` becomes `"dataNascimento"`.
#[must_use]
pub fn camel_case(phrase: &str) -> String {
    let folded = fold(phrase);
    let mut words = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !CONNECTORS.contains(w));

    let Some(first) = words.next() else {
        return String::new();
    };
    let mut out = first.to_string();
    for word in words {
        out.push_str(&capitalize(word));
    }
    out
}

/// Splits an identifier on camel-case humps, underscores and dashes,
/// returning folded parts: `"dataUpload"` gives `["data", "upload"]`.
#[must_use]
pub fn identifier_parts(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                parts.push(fold(&current));
                current.clear();
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            parts.push(fold(&current));
            current.clear();
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(fold(&current));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("Descrição"), "descricao");
        assert_eq!(fold("PREÇO"), "preco");
        assert_eq!(fold("têm"), "tem");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("cliente"), "Cliente");
        assert_eq!(capitalize("órgão"), "Órgão");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("data de nascimento"), "dataNascimento");
        assert_eq!(camel_case("Descrição"), "descricao");
        assert_eq!(camel_case("phone number"), "phoneNumber");
        assert_eq!(camel_case("  "), "");
    }

    #[test]
    fn test_identifier_parts() {
        assert_eq!(identifier_parts("dataUpload"), vec!["data", "upload"]);
        assert_eq!(identifier_parts("birth_date"), vec!["birth", "date"]);
        assert_eq!(identifier_parts("id"), vec!["id"]);
        assert_eq!(identifier_parts("clienteID"), vec!["cliente", "id"]);
    }
}
