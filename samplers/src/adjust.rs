//! Prompt-count adjustment

use servebench_core::SamplerError;

/// Resize `prompts` to `prompt_num` entries.
///
/// - `0` keeps the list as is.
/// - A larger count repeats the whole list; it must be an exact multiple of
///   the list length.
/// - A smaller or equal count keeps the first `prompt_num` prompts.
pub fn adjust_prompt_count(
    mut prompts: Vec<String>,
    prompt_num: usize,
) -> Result<Vec<String>, SamplerError> {
    if prompt_num == 0 {
        return Ok(prompts);
    }

    let len = prompts.len();
    if len == 0 {
        return Err(SamplerError::InvalidConfig(format!(
            "cannot produce {prompt_num} prompts from an empty source"
        )));
    }

    if prompt_num > len {
        if prompt_num % len != 0 {
            return Err(SamplerError::InvalidConfig(format!(
                "prompt count {prompt_num} is not a whole multiple of the {len} source prompts"
            )));
        }
        tracing::debug!(from = len, to = prompt_num, "Replicating prompts");
        return Ok(vec![prompts; prompt_num / len].concat());
    }

    prompts.truncate(prompt_num);
    Ok(prompts)
}
