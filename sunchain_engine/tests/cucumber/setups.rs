use cucumber::given;
use sunchain_common::{Address, Coin};

use crate::cucumber::{world::SettlementSystem, SettlementWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut SettlementWorld) {
    let system = SettlementSystem::new().await;
    world.system = Some(system);
}

fn split_end(end: &str) -> (&str, &str) {
    end.split_once('/').unwrap_or_else(|| panic!("'{end}' is not of the form port/channel"))
}

#[given(expr = "channel {word} is open to {word}")]
async fn open_channel(world: &mut SettlementWorld, local: String, remote: String) {
    let (port, channel) = split_end(&local);
    let (cp_port, cp_channel) = split_end(&remote);
    world.api().open_channel(port, channel, cp_port, cp_channel).await.expect("Error opening channel");
}

#[given(expr = "the counterparty {string} is bound to {word}")]
async fn bind_counterparty(world: &mut SettlementWorld, name: String, local: String) {
    let (port, channel) = split_end(&local);
    world.api().bind_channel(&name, port, channel).await.expect("Error binding channel");
}

#[given(expr = "{string} is funded with {word}")]
async fn fund_account(world: &mut SettlementWorld, name: String, amount: String) {
    let amount = amount.parse::<Coin>().expect("Not a valid coin amount");
    world.api().mint(&Address::from(name), &amount).await.expect("Error minting funds");
}

#[given(expr = "{int} orders have already been placed")]
async fn earlier_orders(world: &mut SettlementWorld, count: u64) {
    let filler = Address::from("filler");
    let api = world.api();
    api.mint(&filler, &Coin::new(u128::from(count), "stake")).await.expect("Error minting funds");
    for _ in 0..count {
        api.buy(&filler, &"1stake".parse().expect("Not a valid coin amount")).await.expect("Error placing order");
    }
}
