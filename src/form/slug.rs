/// Normalize operator input into a URL slug.
///
/// Lowercases, collapses every whitespace run into a single `-`, then drops
/// anything outside `[a-z0-9-]`. Applied on every edit, before validation.
pub fn transform(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_whitespace = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            out.push(ch);
        }
    }

    out
}

pub fn is_valid(slug: &str) -> bool {
    slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(transform("Kerala Floods 2024"), "kerala-floods-2024");
        assert_eq!(transform("  Breaking\t\n News  "), "-breaking-news-");
        assert_eq!(transform("Sports"), "sports");
    }

    #[test]
    fn strips_everything_else() {
        assert_eq!(transform("Café & Bar!"), "caf--bar");
        assert_eq!(transform("കേരളം news"), "-news");
        assert_eq!(transform("a_b.c/d"), "abcd");
    }

    #[test]
    fn idempotent_and_always_valid() {
        let inputs = [
            "",
            "Hello World",
            "  multiple   spaces  ",
            "MiXeD-CaSe--Dashes",
            "emoji 🚀 launch",
            "tabs\tand\nnewlines",
            "കേരളം",
            "ÀÉÎÕÜ ẞ",
            "---",
            "123 456",
        ];
        for input in inputs {
            let once = transform(input);
            assert_eq!(transform(&once), once, "not idempotent for {:?}", input);
            assert!(is_valid(&once), "invalid output {:?} for {:?}", once, input);
        }
    }
}
