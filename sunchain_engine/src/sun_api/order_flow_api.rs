use std::fmt::Debug;

use log::*;
use sunchain_common::{validate_denom, Address, Coin, Coins};

use crate::{
    db::traits::{StoreBackend, StoreTransaction},
    db_types::{ChannelBinding, Order, OrderId},
    events::{EventProducers, OrderPlacedEvent, OrderSettledEvent},
    ledger::{channels, orders, AccountLedger, StoreBank},
    oracle::{multiplier_calldata, OracleRequest, OracleResponse},
    settlement::{SettlementEngine, SettlementOutcome},
    sun_api::{
        config::SettlementConfig,
        messages::{Msg, MsgBuySun, MsgResult},
    },
    transport::{dispatch, ChannelEnd, ChannelTransport, Packet, StoreTransport},
    SettlementError,
};

/// `OrderFlowApi` is the entry point of the settlement module. It places buy orders, binds channels and settles
/// orders when the oracle answers.
///
/// Every state-changing call runs in a single unit of work on the backend: either all of its writes are committed,
/// or none are. Events are only published once the unit of work has committed.
pub struct OrderFlowApi<B, L = StoreBank, T = StoreTransport> {
    db: B,
    config: SettlementConfig,
    engine: SettlementEngine<L>,
    transport: T,
    producers: EventProducers,
    call_data: Vec<u8>,
}

impl<B, L, T> Debug for OrderFlowApi<B, L, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", self.config.module_name)
    }
}

impl<B: StoreBackend> OrderFlowApi<B, StoreBank, StoreTransport> {
    /// Creates the API with the store-backed bank and transport. Fails if `config` does not validate.
    pub fn new(db: B, config: SettlementConfig, producers: EventProducers) -> Result<Self, SettlementError> {
        let bank = StoreBank::new(&config.module_name);
        Self::with_components(db, config, bank, StoreTransport::new(), producers)
    }

    /// Simulates the outcome of a channel handshake. See [`StoreTransport::open_channel`].
    pub async fn open_channel(
        &self,
        port: &str,
        channel: &str,
        counterparty_port: &str,
        counterparty_channel: &str,
    ) -> Result<(), SettlementError> {
        let mut tx = self.db.begin().await?;
        self.transport.open_channel(port, channel, counterparty_port, counterparty_channel, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Where `(port, channel)` leads, if it has been opened.
    pub async fn channel_end(&self, port: &str, channel: &str) -> Result<Option<ChannelEnd>, SettlementError> {
        let mut tx = self.db.begin().await?;
        let end = self.transport.fetch_channel_end(port, channel, &mut tx).await?;
        Ok(end)
    }

    /// The outbound packets waiting on `(port, channel)` for a relayer.
    pub async fn packet_commitments(&self, port: &str, channel: &str) -> Result<Vec<Packet>, SettlementError> {
        let mut tx = self.db.begin().await?;
        let packets = self.transport.packet_commitments(port, channel, &mut tx).await?;
        Ok(packets)
    }
}

impl<B, L, T> OrderFlowApi<B, L, T>
where
    B: StoreBackend,
    L: AccountLedger,
    T: ChannelTransport,
{
    pub fn with_components(
        db: B,
        config: SettlementConfig,
        ledger: L,
        transport: T,
        producers: EventProducers,
    ) -> Result<Self, SettlementError> {
        config.validate()?;
        let engine = SettlementEngine::new(ledger, config.fill_denom.as_str());
        let call_data = multiplier_calldata(config.price_multiplier);
        Ok(Self { db, config, engine, transport, producers, call_data })
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn escrow_address(&self) -> &Address {
        self.engine.ledger().escrow_address()
    }

    /// Places a buy order for `owner`, escrowing `amount`, and asks the oracle on `counterparty_name` for a price.
    ///
    /// If anything fails (unknown counterparty, channel not open, insufficient funds, transport error) the whole
    /// operation is rolled back: no order is recorded, no funds move and no packet is sent.
    pub async fn place_order(
        &self,
        owner: &Address,
        amount: &Coins,
        counterparty_name: &str,
    ) -> Result<OrderId, SettlementError> {
        MsgBuySun::new(owner.clone(), amount.clone()).validate_basic()?;
        let mut tx = self.db.begin().await?;
        let order_id = orders::create_order(owner, amount, &mut tx).await?;
        self.engine.ledger().escrow(owner, amount, &mut tx).await?;
        let request = OracleRequest::build(
            order_id,
            self.config.oracle_script_id,
            &self.call_data,
            self.config.ask_count,
            self.config.min_count,
        );
        let packet = dispatch(&request, counterparty_name, self.config.packet_timeout, &self.transport, &mut tx).await?;
        let order = orders::get_order(order_id, &mut tx).await?;
        tx.commit().await?;
        info!("🔄️📦️ Order {order_id} placed for {owner}. {amount} is in escrow, waiting for the oracle.");
        self.call_order_placed_hook(OrderPlacedEvent::new(order, request, packet)).await;
        Ok(order_id)
    }

    /// Places an order priced by the oracle chain named in the configuration.
    pub async fn buy(&self, owner: &Address, amount: &Coins) -> Result<OrderId, SettlementError> {
        self.place_order(owner, amount, &self.config.oracle_counterparty).await
    }

    pub async fn bind_channel(&self, counterparty_name: &str, port: &str, channel: &str) -> Result<(), SettlementError> {
        let mut tx = self.db.begin().await?;
        channels::set_binding(counterparty_name, port, channel, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Settles the order that `response` answers.
    ///
    /// A response for an order that has already settled is acknowledged with
    /// [`SettlementOutcome::AlreadySettled`] and changes nothing. Any error leaves the order as it was, so the
    /// response can safely be redelivered.
    pub async fn handle_oracle_response(&self, response: &OracleResponse) -> Result<SettlementOutcome, SettlementError> {
        let order_id = response.order_id()?;
        let mut tx = self.db.begin().await?;
        let order = orders::get_order(order_id, &mut tx).await?;
        let price = response.price()?;
        let (order, outcome) = self.engine.settle(order, price, &mut tx).await?;
        if outcome == SettlementOutcome::AlreadySettled {
            debug!("🔄️⚖️ Duplicate oracle response for order {order_id} ignored");
            return Ok(outcome);
        }
        tx.commit().await?;
        self.call_order_settled_hook(OrderSettledEvent::new(order, outcome.clone())).await;
        Ok(outcome)
    }

    /// Handles an inbound packet. Its data must be an oracle response.
    pub async fn handle_packet(&self, packet: &Packet) -> Result<SettlementOutcome, SettlementError> {
        trace!("🔄️📥️ Packet #{} received on {}/{}", packet.sequence, packet.destination_port, packet.destination_channel);
        let response = OracleResponse::from_packet_data(&packet.data)?;
        self.handle_oracle_response(&response).await
    }

    /// The module's message router.
    pub async fn handle_msg(&self, msg: Msg) -> Result<MsgResult, SettlementError> {
        msg.validate_basic()?;
        match msg {
            Msg::BuySun(msg) => {
                let order_id = self.buy(&msg.buyer, &msg.amount).await?;
                Ok(MsgResult::OrderPlaced(order_id))
            },
            Msg::SetSourceChannel(msg) => {
                debug!("🔄️🔗️ {} binds {} to {}/{}", msg.signer, msg.chain_name, msg.source_port, msg.source_channel);
                self.bind_channel(&msg.chain_name, &msg.source_port, &msg.source_channel).await?;
                Ok(MsgResult::ChannelBound)
            },
            Msg::RecvPacket(packet) => {
                let order_id = OracleResponse::from_packet_data(&packet.data)?.order_id()?;
                let outcome = self.handle_packet(&packet).await?;
                Ok(MsgResult::Settled { order_id, outcome })
            },
        }
    }

    /// Credits newly created funds to `address`. For genesis funding and development networks.
    pub async fn mint(&self, address: &Address, amount: &Coin) -> Result<(), SettlementError> {
        address.validate().map_err(|e| SettlementError::InvalidMessage(e.to_string()))?;
        validate_denom(&amount.denom).map_err(|e| SettlementError::InvalidMessage(e.to_string()))?;
        let mut tx = self.db.begin().await?;
        self.engine.ledger().mint(address, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn call_order_placed_hook(&self, event: OrderPlacedEvent) {
        for emitter in &self.producers.order_placed_producer {
            debug!("🔄️📦️ Notifying order placed hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    async fn call_order_settled_hook(&self, event: OrderSettledEvent) {
        for emitter in &self.producers.order_settled_producer {
            debug!("🔄️⚖️ Notifying order settled hook subscribers");
            emitter.publish_event(event.clone()).await;
        }
    }

    //--------------------------------------  Queries  --------------------------------------------------------------

    pub async fn fetch_order(&self, order_id: OrderId) -> Result<Option<Order>, SettlementError> {
        let mut tx = self.db.begin().await?;
        orders::fetch_order(order_id, &mut tx).await
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Order>, SettlementError> {
        let mut tx = self.db.begin().await?;
        orders::fetch_orders(&mut tx).await
    }

    pub async fn orders_for_owner(&self, owner: &Address) -> Result<Vec<Order>, SettlementError> {
        let mut tx = self.db.begin().await?;
        orders::orders_for_owner(owner, &mut tx).await
    }

    pub async fn order_count(&self) -> Result<u64, SettlementError> {
        let mut tx = self.db.begin().await?;
        orders::order_count(&mut tx).await
    }

    pub async fn fetch_bindings(&self) -> Result<Vec<ChannelBinding>, SettlementError> {
        let mut tx = self.db.begin().await?;
        channels::fetch_bindings(&mut tx).await
    }

    pub async fn balance(&self, address: &Address, denom: &str) -> Result<u128, SettlementError> {
        let mut tx = self.db.begin().await?;
        let balance = self.engine.ledger().balance(address, denom, &mut tx).await?;
        Ok(balance)
    }

    pub async fn balances(&self, address: &Address) -> Result<Vec<Coin>, SettlementError> {
        let mut tx = self.db.begin().await?;
        let balances = self.engine.ledger().balances(address, &mut tx).await?;
        Ok(balances)
    }
}
