use anyhow::Result;
use clap::ValueEnum;
use ledger_core::{canonical_json, Block};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One labelled field per line
    Text,
    /// Pretty-printed JSON array of blocks
    Json,
}

pub fn render_block<P: Serialize>(block: &Block<P>, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(format!(
            "Block #{}\n  timestamp:        {}\n  preceding digest: {}\n  digest:           {}\n  nonce:            {}\n  payload:          {}",
            block.index(),
            block.timestamp(),
            block.preceding_digest(),
            block.digest(),
            block.nonce(),
            canonical_json(block.payload())?,
        )),
        Format::Json => Ok(serde_json::to_string_pretty(block)?),
    }
}

pub fn render_chain<P: Serialize>(blocks: &[Block<P>], format: Format) -> Result<String> {
    match format {
        Format::Text => {
            let rendered = blocks
                .iter()
                .map(|block| render_block(block, format))
                .collect::<Result<Vec<_>>>()?;
            Ok(rendered.join("\n\n"))
        }
        Format::Json => Ok(serde_json::to_string_pretty(blocks)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{Chain, Difficulty, PendingBlock};
    use serde_json::{json, Value};

    fn sample_chain() -> Chain<Value> {
        let mut chain = Chain::new(Difficulty::new(1).unwrap()).unwrap();
        chain
            .append(PendingBlock::new(1, "01/06/2021", json!({"b": 2, "a": 1})).unwrap())
            .unwrap();
        chain
    }

    #[test]
    fn text_lists_every_field() {
        let chain = sample_chain();
        let tip = chain.last_block();
        let text = render_block(tip, Format::Text).unwrap();
        assert!(text.starts_with("Block #1\n"));
        assert!(text.contains("timestamp:        01/06/2021"));
        assert!(text.contains(&format!("preceding digest: {}", tip.preceding_digest())));
        assert!(text.contains(&format!("digest:           {}", tip.digest())));
        assert!(text.contains(&format!("nonce:            {}", tip.nonce())));
        assert!(text.ends_with(r#"payload:          {"a":1,"b":2}"#));
    }

    #[test]
    fn json_block_round_trips() {
        let chain = sample_chain();
        let rendered = render_block(chain.last_block(), Format::Json).unwrap();
        let parsed: Block<Value> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(&parsed, chain.last_block());
    }

    #[test]
    fn text_chain_separates_blocks() {
        let chain = sample_chain();
        let text = render_chain(chain.blocks(), Format::Text).unwrap();
        assert_eq!(text.matches("Block #").count(), 2);
        assert!(text.contains("\n\nBlock #1\n"));
    }

    #[test]
    fn json_chain_is_an_array() {
        let chain = sample_chain();
        let rendered = render_chain(chain.blocks(), Format::Json).unwrap();
        let parsed: Vec<Block<Value>> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.as_slice(), chain.blocks());
    }
}
