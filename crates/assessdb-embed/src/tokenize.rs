use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// BERT-family `[PAD]` id.
pub const PAD_ID: u32 = 0;

/// Tokenize a batch, truncate each row to `max_len` and right-pad to the
/// longest row. Returns `(input_ids, attention_mask)`, both `[B, T]` u32.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let rows: Vec<(Vec<u32>, Vec<u32>)> = encodings
        .iter()
        .map(|enc| {
            let keep = enc.get_ids().len().min(max_len);
            (enc.get_ids()[..keep].to_vec(), enc.get_attention_mask()[..keep].to_vec())
        })
        .collect();
    let width = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);

    let mut ids = Vec::with_capacity(rows.len() * width);
    let mut mask = Vec::with_capacity(rows.len() * width);
    for (row_ids, row_mask) in rows {
        let pad = width - row_ids.len();
        ids.extend(row_ids);
        ids.extend(std::iter::repeat(PAD_ID).take(pad));
        mask.extend(row_mask);
        mask.extend(std::iter::repeat(0u32).take(pad));
    }
    let batch = texts.len();
    let input_ids = Tensor::from_vec(ids, (batch, width), device)?;
    let attention_mask = Tensor::from_vec(mask, (batch, width), device)?;
    Ok((input_ids, attention_mask))
}
