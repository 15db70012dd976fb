use mkey::config::MkeyConfig;
use mkey::machine::MkeyEvent;
use mkey::processor::MkeyProcessor;
use mkey::types::action::{HostAction, ZoneSide};
use mkey::types::led_indicator::LedIndicator;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const L: ZoneSide = ZoneSide::Left;
pub const R: ZoneSide = ZoneSide::Right;

pub fn press(index: u8, side: ZoneSide) -> MkeyEvent {
    MkeyEvent::zone(index, side, true)
}

pub fn release(index: u8, side: ZoneSide) -> MkeyEvent {
    MkeyEvent::zone(index, side, false)
}

pub fn typing(pressed: bool) -> MkeyEvent {
    MkeyEvent::Typing { pressed }
}

/// Create a started processor for the 12x4 reference config, the startup actions are dropped
pub fn started_processor(config: &MkeyConfig<4, 4>) -> MkeyProcessor<'_, 4, 4> {
    let mut processor = MkeyProcessor::try_new(config).unwrap();
    processor.start(LedIndicator::new());
    processor
}

/// Feed a sequence of events, with the host lock indicators all off, and collect all actions
pub fn run_sequence<const N: usize, const NUM_LAYER: usize>(
    processor: &mut MkeyProcessor<'_, N, NUM_LAYER>,
    events: &[MkeyEvent],
) -> Vec<HostAction> {
    events
        .iter()
        .flat_map(|e| processor.process(*e, LedIndicator::new()))
        .collect()
}
