//! LR-020: Placeholder Dockerfile.

use crate::core::layout::Layout;

pub const BASE_IMAGE: &str = "continuumio/miniconda3:latest";

/// Minimal container descriptor: base image plus the environment install step.
pub fn placeholder(layout: &Layout, env_name: &str) -> String {
    let env_file = layout.rel(&layout.env_file);
    format!(
        "# Placeholder generated by labrun. Customize before building.\n\
         FROM {base}\n\
         WORKDIR /workspace\n\
         COPY {env_file} /tmp/environment.yml\n\
         RUN conda env create -n {env} -f /tmp/environment.yml && conda clean -afy\n\
         SHELL [\"conda\", \"run\", \"-n\", \"{env}\", \"/bin/bash\", \"-c\"]\n",
        base = BASE_IMAGE,
        env_file = env_file,
        env = env_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_lr020_placeholder_minimal() {
        let layout = Layout::new(Path::new("/proj"));
        let text = placeholder(&layout, "bioinfo-pipeline");
        let instructions: Vec<_> = text
            .lines()
            .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
            .collect();
        assert!(instructions[0].starts_with("FROM "));
        assert!(instructions.iter().any(|l| l.starts_with("RUN conda env create -n bioinfo-pipeline")));
        assert!(text.contains("COPY environment.yml "));
    }

    #[test]
    fn test_lr020_placeholder_every_line_is_instruction() {
        let layout = Layout::new(Path::new("/proj"));
        let keywords = ["FROM", "WORKDIR", "COPY", "RUN", "SHELL"];
        for line in placeholder(&layout, "env").lines() {
            if line.starts_with('#') {
                continue;
            }
            let kw = line.split_whitespace().next().unwrap();
            assert!(keywords.contains(&kw), "unexpected instruction {}", kw);
        }
    }
}
