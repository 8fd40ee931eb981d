//! Referee provider: latest game-controller message

use super::{Provider, ProviderKind};
use crate::error::Result;
use crate::net::UdpReceiver;
use maidan::WorldModel;
use maidan::world::RefereeCommand;

pub struct RefereeProvider {
    address: String,
    receiver: Option<UdpReceiver>,
    last_command: Option<RefereeCommand>,
}

impl RefereeProvider {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            receiver: None,
            last_command: None,
        }
    }

    /// Store one raw referee payload, logging command changes.
    pub fn absorb_payload(&mut self, world: &mut WorldModel, payload: &[u8]) {
        world.set_referee_message(payload.to_vec());
        let command = world.referee_command();
        if command != self.last_command {
            match command {
                Some(c) => log::info!("Referee command: {:?}", c),
                None => log::warn!("Referee message without a known command"),
            }
            self.last_command = command;
        }
    }
}

impl Provider for RefereeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Referee
    }

    fn pre_run(&mut self, _world: &mut WorldModel) -> Result<()> {
        self.receiver = Some(UdpReceiver::bind(&self.address)?);
        Ok(())
    }

    fn run(&mut self, world: &mut WorldModel) -> Result<()> {
        let payload = match self.receiver.as_mut() {
            Some(receiver) => receiver.recv()?.map(<[u8]>::to_vec),
            None => None,
        };
        if let Some(payload) = payload {
            self.absorb_payload(world, &payload);
        }
        Ok(())
    }

    fn post_run(&mut self, _world: &mut WorldModel) {
        self.receiver = None;
    }
}
