/*!
 * # Forecasting Models
 *
 * Numeric models behind the inventory forecast. The average-rate demand
 * model is the only one in use; it carries no I/O and no scheduling.
 */

/// Average-rate demand forecasting and reorder recommendations
pub mod forecasting;
