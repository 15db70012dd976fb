use embassy_sync::channel::{Receiver, Sender};
use mkey_types::action::HostAction;

use crate::RawMutex;
use crate::channel::{HOST_ACTION_CHANNEL, MKEY_EVENT_CHANNEL, lock_leds};
use crate::machine::MkeyEvent;
use crate::processor::MkeyProcessor;

/// A task which runs forever
#[allow(async_fn_in_trait)]
pub trait Runnable {
    async fn run(&mut self);
}

impl<const N: usize, const NUM_LAYER: usize> Runnable for MkeyProcessor<'_, N, NUM_LAYER> {
    /// Main MKEY task, it receives events from `MKEY_EVENT_CHANNEL` and sends the host actions to `HOST_ACTION_CHANNEL`.
    async fn run(&mut self) {
        self.run_with(MKEY_EVENT_CHANNEL.receiver(), HOST_ACTION_CHANNEL.sender())
            .await
    }
}

impl<const N: usize, const NUM_LAYER: usize> MkeyProcessor<'_, N, NUM_LAYER> {
    /// Run the processor on the given channel endpoints.
    ///
    /// The initial layer is selected first. Each event is processed completely, and all its actions are sent,
    /// before the next event is received.
    pub async fn run_with<const EVENT_SIZE: usize, const ACTION_SIZE: usize>(
        &mut self,
        events: Receiver<'_, RawMutex, MkeyEvent, EVENT_SIZE>,
        actions: Sender<'_, RawMutex, HostAction, ACTION_SIZE>,
    ) {
        for action in self.start(lock_leds()) {
            actions.send(action).await;
        }
        loop {
            let event = events.receive().await;
            debug!("MKEY event: {:?}", event);
            for action in self.process(event, lock_leds()) {
                actions.send(action).await;
            }
        }
    }
}
