//! LR-022: Placeholder documentation index.

pub const INDEX_FILE: &str = "index.md";

pub fn placeholder(project: &str) -> String {
    format!(
        "# {}\n\n\
         Pipeline documentation. Run `labrun dag` to render the workflow graph.\n",
        project
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lr022_placeholder_heading() {
        let text = placeholder("wgs");
        assert!(text.starts_with("# wgs\n"));
        assert!(text.contains("labrun dag"));
    }
}
