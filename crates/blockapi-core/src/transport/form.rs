//! `application/x-www-form-urlencoded` bodies.

/// Encodes fields in order, e.g. `cid=42&title=Week+1`.
pub fn encode_form(fields: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn keeps_order_and_escapes() {
        assert_eq!(
            encode_form(&pairs(&[("cid", "42"), ("title", "Week 1 & 2")])),
            "cid=42&title=Week+1+%26+2"
        );
    }

    #[test]
    fn empty_form() {
        assert_eq!(encode_form(&[]), "");
    }
}
