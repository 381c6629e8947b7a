//! Account balance tracking and the daily-loss circuit breaker.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountState {
    pub balance: f64,
    /// Balance at the start of the current session.
    pub initial_balance: f64,
}

impl AccountState {
    pub fn new(balance: f64) -> Self {
        AccountState {
            balance,
            initial_balance: balance,
        }
    }

    pub fn start_session(&mut self, balance: f64) {
        self.balance = balance;
        self.initial_balance = balance;
    }

    /// Lowest balance allowed before the breaker trips.
    pub fn drawdown_floor(&self, max_daily_loss: f64) -> f64 {
        self.initial_balance * (1.0 + max_daily_loss)
    }

    pub fn is_breached(&self, max_daily_loss: f64) -> bool {
        self.balance < self.drawdown_floor(max_daily_loss)
    }

    /// Fractional change since session start; 0 when the session started empty.
    pub fn daily_return(&self) -> f64 {
        if self.initial_balance == 0.0 {
            0.0
        } else {
            self.balance / self.initial_balance - 1.0
        }
    }
}
