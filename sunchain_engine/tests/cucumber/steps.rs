use std::time::Duration;

use cucumber::{then, when};
use sunchain_common::{Address, Coin, Coins};
use sunchain_engine::{
    db_types::{OrderId, OrderStatusType},
    oracle::{OracleRequest, OracleResponse},
    transport::Packet,
    Msg,
    MsgBuySun,
    MsgResult,
};

use crate::cucumber::{world::error_kind, SettlementWorld};

fn coins(s: &str) -> Coins {
    s.parse().expect("Not a valid amount")
}

fn split_end(end: &str) -> (&str, &str) {
    end.split_once('/').unwrap_or_else(|| panic!("'{end}' is not of the form port/channel"))
}

#[when(expr = "{string} buys with {word}")]
async fn buy(world: &mut SettlementWorld, name: String, amount: String) {
    let msg = Msg::BuySun(MsgBuySun::new(Address::from(name), coins(&amount)));
    let result = world.api().handle_msg(msg).await;
    world.record(result);
}

#[when(expr = "{string} buys with {word} via {string}")]
async fn buy_via(world: &mut SettlementWorld, name: String, amount: String, counterparty: String) {
    let result = world.api().place_order(&Address::from(name), &coins(&amount), &counterparty).await;
    world.record(result);
}

async fn relay_response(world: &mut SettlementWorld, response: OracleResponse) {
    let packet = Packet {
        sequence: 1,
        source_port: "oracle".to_string(),
        source_channel: "channel-9".to_string(),
        destination_port: "sunchain".to_string(),
        destination_channel: "channel-0".to_string(),
        data: response.to_bytes().expect("Error serializing response"),
        timeout_height: 1_000_000_000,
    };
    let result = world.api().handle_msg(Msg::RecvPacket(packet)).await;
    world.last_outcome = match world.record(result) {
        Some(MsgResult::Settled { outcome, .. }) => Some(outcome),
        _ => None,
    };
}

#[when(expr = "the oracle answers {string} with price {int}")]
async fn oracle_answers(world: &mut SettlementWorld, client_id: String, px: u64) {
    relay_response(world, OracleResponse::success(&client_id, px)).await;
}

#[when(expr = "the oracle answers {string} with raw result {string}")]
async fn oracle_answers_raw(world: &mut SettlementWorld, client_id: String, result: String) {
    let mut response = OracleResponse::success(&client_id, 1);
    response.result = result;
    relay_response(world, response).await;
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut SettlementWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then(expr = "order {int} is {word}")]
async fn check_order_status(world: &mut SettlementWorld, id: u64, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let order = world.api().fetch_order(OrderId(id)).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.status, status, "Order status is incorrect");
}

#[then(expr = "order {int} does not exist")]
async fn check_order_absent(world: &mut SettlementWorld, id: u64) {
    let order = world.api().fetch_order(OrderId(id)).await.expect("Error fetching order");
    assert!(order.is_none(), "Order {id} exists");
}

#[then(expr = "order {int} filled {word}")]
async fn check_order_fill(world: &mut SettlementWorld, id: u64, amount: String) {
    let order = world.api().fetch_order(OrderId(id)).await.expect("Error fetching order").expect("Order not found");
    let expected = amount.parse::<Coin>().expect("Not a valid coin amount");
    assert_eq!(order.filled_amount, Some(expected), "Filled amount is incorrect");
}

#[then(expr = "order {int} has no fill")]
async fn check_order_no_fill(world: &mut SettlementWorld, id: u64) {
    let order = world.api().fetch_order(OrderId(id)).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.filled_amount, None, "Order should not have a fill");
}

#[then(expr = "there are {int} orders")]
async fn check_order_count(world: &mut SettlementWorld, count: u64) {
    let actual = world.api().order_count().await.expect("Error fetching order count");
    assert_eq!(actual, count, "Order count is incorrect");
}

#[then(expr = "the outcome is {word}")]
async fn check_outcome(world: &mut SettlementWorld, outcome: String) {
    let actual = world.last_outcome.as_ref().expect("No settlement outcome was recorded");
    assert_eq!(actual.to_string(), outcome, "Settlement outcome is incorrect");
}

#[then(expr = "the last operation failed with {word}")]
async fn check_error(world: &mut SettlementWorld, kind: String) {
    let err = world.last_error.as_ref().expect("The last operation succeeded");
    assert_eq!(error_kind(err), kind, "Unexpected error: {err}");
}

#[then("the last operation succeeded")]
async fn check_success(world: &mut SettlementWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
}

#[then(expr = "the balance of {string} is {int} {word}")]
async fn check_balance(world: &mut SettlementWorld, name: String, amount: u128, denom: String) {
    let balance = world.api().balance(&Address::from(name), &denom).await.expect("Error fetching balance");
    assert_eq!(balance, amount, "Balance is incorrect");
}

#[then(expr = "the escrow holds {int} {word}")]
async fn check_escrow(world: &mut SettlementWorld, amount: u128, denom: String) {
    let api = world.api();
    let balance = api.balance(api.escrow_address(), &denom).await.expect("Error fetching balance");
    assert_eq!(balance, amount, "Escrow balance is incorrect");
}

#[then(expr = "{int} packets are waiting on {word}")]
async fn check_packet_count(world: &mut SettlementWorld, count: usize, local: String) {
    let (port, channel) = split_end(&local);
    let packets = world.api().packet_commitments(port, channel).await.expect("Error fetching packets");
    assert_eq!(packets.len(), count, "Packet count is incorrect");
}

#[then(expr = "packet {int} on {word} requests a price for {string}")]
async fn check_packet_request(world: &mut SettlementWorld, sequence: u64, local: String, client_id: String) {
    let (port, channel) = split_end(&local);
    let packets = world.api().packet_commitments(port, channel).await.expect("Error fetching packets");
    let packet = packets.iter().find(|p| p.sequence == sequence).expect("Packet not found");
    let request: OracleRequest = serde_json::from_slice(&packet.data).expect("Packet is not an oracle request");
    assert_eq!(request.correlation_id, client_id, "Correlation id is incorrect");
}
