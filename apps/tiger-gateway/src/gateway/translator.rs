//! Platform <-> Tiger vocabulary mapping.
//!
//! Pure functions with no state. Mappings toward Tiger return `Option` when a
//! platform value has no Tiger counterpart; mappings from Tiger always yield
//! a platform value, falling back to a documented default.

use crate::broker::{ActionType, Market, TigerOrderStatus, TigerOrderType};
use crate::domain::shared::Exchange;
use crate::domain::trading::{Direction, Interval, OrderStatus, OrderType, Product};

/// Tiger market for a platform exchange.
#[must_use]
pub const fn market_for(exchange: Exchange) -> Option<Market> {
    match exchange {
        Exchange::Nasdaq | Exchange::Nyse => Some(Market::Us),
        Exchange::Sehk => Some(Market::Hk),
        Exchange::Sse | Exchange::Szse => Some(Market::Cn),
    }
}

/// Platform exchange for a Tiger market.
///
/// Tiger reports markets, not venues, so each market maps to its primary
/// exchange.
#[must_use]
pub const fn exchange_for(market: Market) -> Exchange {
    match market {
        Market::Us => Exchange::Nasdaq,
        Market::Hk => Exchange::Sehk,
        Market::Cn => Exchange::Sse,
    }
}

/// Tiger action for a platform direction.
#[must_use]
pub const fn action_for(direction: Direction) -> ActionType {
    match direction {
        Direction::Long => ActionType::Buy,
        Direction::Short => ActionType::Sell,
    }
}

/// Platform direction for a Tiger action.
#[must_use]
pub const fn direction_for(action: ActionType) -> Direction {
    match action {
        ActionType::Buy => Direction::Long,
        ActionType::Sell => Direction::Short,
    }
}

/// Tiger order type for a platform order type.
#[must_use]
pub const fn tiger_order_type(order_type: OrderType) -> TigerOrderType {
    match order_type {
        OrderType::Market => TigerOrderType::Mkt,
        OrderType::Limit => TigerOrderType::Lmt,
        OrderType::Stop => TigerOrderType::Stp,
    }
}

/// Platform order type for a Tiger order type. Stop-limit collapses to stop.
#[must_use]
pub const fn order_type_for(order_type: TigerOrderType) -> OrderType {
    match order_type {
        TigerOrderType::Mkt => OrderType::Market,
        TigerOrderType::Lmt => OrderType::Limit,
        TigerOrderType::Stp | TigerOrderType::StpLmt => OrderType::Stop,
    }
}

/// Platform status for a Tiger status. Unrecognized statuses map to
/// `Submitting`.
#[must_use]
pub const fn status_for(status: &TigerOrderStatus) -> OrderStatus {
    match status {
        TigerOrderStatus::PendingNew | TigerOrderStatus::Unknown(_) => OrderStatus::Submitting,
        TigerOrderStatus::New => OrderStatus::NotTraded,
        TigerOrderStatus::PartiallyFilled => OrderStatus::PartTraded,
        TigerOrderStatus::Filled => OrderStatus::AllTraded,
        TigerOrderStatus::PendingCancel => OrderStatus::Cancelling,
        TigerOrderStatus::Cancelled | TigerOrderStatus::Expired => OrderStatus::Cancelled,
        TigerOrderStatus::Rejected => OrderStatus::Rejected,
    }
}

/// Platform status for a raw Tiger status string.
#[must_use]
pub fn status_from_str(status: &str) -> OrderStatus {
    status_for(&TigerOrderStatus::parse(status))
}

/// Product class for a Tiger security type. Unknown types are equities.
#[must_use]
pub fn product_for(sec_type: &str) -> Product {
    match sec_type.trim().to_ascii_uppercase().as_str() {
        "OPT" => Product::Option,
        "FUT" => Product::Futures,
        "WAR" | "IOPT" => Product::Warrant,
        _ => Product::Equity,
    }
}

/// Tiger bar period for a platform interval.
#[must_use]
pub const fn bar_period(interval: Interval) -> &'static str {
    match interval {
        Interval::Minute => "1min",
        Interval::Hour => "60min",
        Interval::Daily => "day",
        Interval::Weekly => "week",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("PendingNew", OrderStatus::Submitting; "pending new")]
    #[test_case("Initial", OrderStatus::NotTraded; "new")]
    #[test_case("PartiallyFilled", OrderStatus::PartTraded; "partially filled")]
    #[test_case("Filled", OrderStatus::AllTraded; "filled")]
    #[test_case("PendingCancel", OrderStatus::Cancelling; "pending cancel")]
    #[test_case("Cancelled", OrderStatus::Cancelled; "cancelled")]
    #[test_case("Inactive", OrderStatus::Rejected; "rejected")]
    #[test_case("Invalid", OrderStatus::Cancelled; "expired")]
    #[test_case("Held", OrderStatus::Submitting; "unknown falls back")]
    #[test_case("", OrderStatus::Submitting; "empty falls back")]
    fn status_table(raw: &str, expected: OrderStatus) {
        assert_eq!(status_from_str(raw), expected);
    }

    #[test_case(Exchange::Nasdaq, Market::Us)]
    #[test_case(Exchange::Nyse, Market::Us)]
    #[test_case(Exchange::Sehk, Market::Hk)]
    #[test_case(Exchange::Sse, Market::Cn)]
    #[test_case(Exchange::Szse, Market::Cn)]
    fn exchange_to_market(exchange: Exchange, market: Market) {
        assert_eq!(market_for(exchange), Some(market));
    }

    #[test_case(Market::Us, Exchange::Nasdaq)]
    #[test_case(Market::Hk, Exchange::Sehk)]
    #[test_case(Market::Cn, Exchange::Sse)]
    fn market_to_primary_exchange(market: Market, exchange: Exchange) {
        assert_eq!(exchange_for(market), exchange);
    }

    #[test]
    fn direction_is_bijective() {
        for direction in [Direction::Long, Direction::Short] {
            assert_eq!(direction_for(action_for(direction)), direction);
        }
        assert_eq!(action_for(Direction::Long), ActionType::Buy);
        assert_eq!(action_for(Direction::Short), ActionType::Sell);
    }

    #[test_case(TigerOrderType::Mkt, OrderType::Market)]
    #[test_case(TigerOrderType::Lmt, OrderType::Limit)]
    #[test_case(TigerOrderType::Stp, OrderType::Stop)]
    #[test_case(TigerOrderType::StpLmt, OrderType::Stop)]
    fn tiger_order_types(tiger: TigerOrderType, expected: OrderType) {
        assert_eq!(order_type_for(tiger), expected);
    }

    #[test]
    fn platform_order_types() {
        assert_eq!(tiger_order_type(OrderType::Market), TigerOrderType::Mkt);
        assert_eq!(tiger_order_type(OrderType::Limit), TigerOrderType::Lmt);
        assert_eq!(tiger_order_type(OrderType::Stop), TigerOrderType::Stp);
    }

    #[test_case(Interval::Minute, "1min")]
    #[test_case(Interval::Hour, "60min")]
    #[test_case(Interval::Daily, "day")]
    #[test_case(Interval::Weekly, "week")]
    fn bar_periods(interval: Interval, period: &str) {
        assert_eq!(bar_period(interval), period);
    }

    #[test_case("STK", Product::Equity)]
    #[test_case("opt", Product::Option)]
    #[test_case("FUT", Product::Futures)]
    #[test_case("WAR", Product::Warrant)]
    #[test_case("CASH", Product::Equity)]
    fn products(sec_type: &str, product: Product) {
        assert_eq!(product_for(sec_type), product);
    }
}
