//! Model module containing data structures for forecasting

mod arima_order;

pub use arima_order::ArimaOrder;
