#![allow(clippy::format_push_string)]

use crate::metrics::PerformanceSnapshot;
use crate::session::SimulationSession;

/// Renders the terminal report printed when a session closes.
pub struct SessionSummary;

impl SessionSummary {
    #[must_use]
    pub fn format(session: &SimulationSession, snapshot: &PerformanceSnapshot) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    SIMULATION SESSION                         \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Session\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Id:                    {}\n", session.id));
        output.push_str(&format!("Mode:                  {}\n", session.mode.as_str()));
        output.push_str(&format!(
            "Started:               {}\n",
            session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        if let Some(ended_at) = session.ended_at {
            output.push_str(&format!(
                "Ended:                 {}\n",
                ended_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            let duration = ended_at - session.started_at;
            output.push_str(&format!(
                "Duration:              {}h {}m {}s\n",
                duration.num_hours(),
                duration.num_minutes() % 60,
                duration.num_seconds() % 60
            ));
        }
        output.push('\n');

        output.push_str("Portfolio\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "Initial Balance:       {} SOL\n",
            session.initial_sol_balance
        ));
        output.push_str(&format!(
            "Final Balance:         {} SOL\n",
            snapshot.sol_balance
        ));
        output.push_str(&format!(
            "Total Value:           {} SOL\n",
            snapshot.total_value
        ));
        output.push_str(&format!(
            "Realized PnL:          {} SOL\n",
            snapshot.total_realized_pnl
        ));
        output.push_str(&format!(
            "Unrealized PnL:        {} SOL\n",
            snapshot.total_unrealized_pnl
        ));
        output.push_str(&format!(
            "Max Drawdown:          {:.2}%\n",
            snapshot.max_drawdown_percent
        ));
        output.push('\n');

        output.push_str("Trades\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Total Trades:          {}\n", snapshot.total_trades));
        output.push_str(&format!(
            "Wins / Losses:         {} / {}\n",
            snapshot.win_count, snapshot.loss_count
        ));
        output.push_str(&format!(
            "Win Rate:              {:.2}%\n",
            snapshot.win_rate_percent
        ));
        output.push_str(&format!(
            "Avg ROI per Sell:      {:.2}%\n",
            snapshot.avg_roi_percent
        ));
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        output
    }
}
