use crate::cache::VerseCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::CacheConfig;
use crate::error::Result;

pub fn run(cache: &VerseCache, config: CacheConfig) -> Result<CmdResult> {
    let stats = cache.stats();
    let mut result = CmdResult::default();

    if stats.present_verses == 0 {
        result.add_message(CmdMessage::info("Cache is empty."));
    }
    Ok(result.with_stats(stats).with_config(config))
}
