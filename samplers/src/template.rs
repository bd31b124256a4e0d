//! Model-specific prompt wrappers

use serde::{Deserialize, Serialize};

const LLAMA: &str = "[INST]%s[/INST]";
const BAICHUAN: &str = "<reserved_106>%s<reserved_107>";
const QWEN: &str = "<|im_start|>system\nYou are a helpful assistant.<|im_end|>\n\
                    <|im_start|>user\n%s<|im_end|>\n<|im_start|>assistant\n";

/// Chat template applied to every prompt before it is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    /// `[INST]...[/INST]`
    #[default]
    Llama,
    /// Baichuan reserved-token wrapper
    Baichuan,
    /// ChatML with a default system message
    Qwen,
    /// Prompt sent as is
    None,
}

impl PromptTemplate {
    fn pattern(&self) -> Option<&'static str> {
        match self {
            PromptTemplate::Llama => Some(LLAMA),
            PromptTemplate::Baichuan => Some(BAICHUAN),
            PromptTemplate::Qwen => Some(QWEN),
            PromptTemplate::None => None,
        }
    }

    /// Wrap one prompt
    pub fn apply(&self, prompt: &str) -> String {
        match self.pattern() {
            Some(pattern) => pattern.replace("%s", prompt),
            None => prompt.to_string(),
        }
    }

    /// Wrap every prompt, keeping order
    pub fn apply_all(&self, prompts: Vec<String>) -> Vec<String> {
        if self.pattern().is_none() {
            return prompts;
        }
        prompts.iter().map(|p| self.apply(p)).collect()
    }
}

impl std::fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PromptTemplate::Llama => "llama",
            PromptTemplate::Baichuan => "baichuan",
            PromptTemplate::Qwen => "qwen",
            PromptTemplate::None => "none",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for PromptTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "llama" => Ok(PromptTemplate::Llama),
            "baichuan" => Ok(PromptTemplate::Baichuan),
            "qwen" => Ok(PromptTemplate::Qwen),
            "none" | "raw" => Ok(PromptTemplate::None),
            _ => Err(format!("Unknown model type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llama() {
        assert_eq!(PromptTemplate::Llama.apply("Hi"), "[INST]Hi[/INST]");
    }

    #[test]
    fn test_baichuan() {
        assert_eq!(
            PromptTemplate::Baichuan.apply("Hi"),
            "<reserved_106>Hi<reserved_107>"
        );
    }

    #[test]
    fn test_qwen() {
        assert_eq!(
            PromptTemplate::Qwen.apply("Hi"),
            "<|im_start|>system\nYou are a helpful assistant.<|im_end|>\n\
             <|im_start|>user\nHi<|im_end|>\n<|im_start|>assistant\n"
        );
    }

    #[test]
    fn test_none_is_identity() {
        let prompts = vec!["a".to_string(), "%s".to_string()];
        assert_eq!(PromptTemplate::None.apply_all(prompts.clone()), prompts);
    }

    #[test]
    fn test_prompt_containing_placeholder() {
        // only the template's own placeholder is substituted
        assert_eq!(PromptTemplate::Llama.apply("50%s off"), "[INST]50%s off[/INST]");
    }

    #[test]
    fn test_apply_all_keeps_order() {
        let wrapped = PromptTemplate::Baichuan.apply_all(vec!["x".into(), "y".into()]);
        assert_eq!(
            wrapped,
            vec![
                "<reserved_106>x<reserved_107>",
                "<reserved_106>y<reserved_107>"
            ]
        );
    }

    #[test]
    fn test_from_str_round_trip() {
        for template in [
            PromptTemplate::Llama,
            PromptTemplate::Baichuan,
            PromptTemplate::Qwen,
            PromptTemplate::None,
        ] {
            assert_eq!(template.to_string().parse::<PromptTemplate>().unwrap(), template);
        }
        assert!("gpt".parse::<PromptTemplate>().is_err());
    }
}
