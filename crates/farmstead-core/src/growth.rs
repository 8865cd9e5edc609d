//! Pure plot lifecycle transitions.
//!
//! These functions decide the next [`PlotState`] without touching storage.
//! The engine locks the plot, calls one of them, and saves the result only
//! if it returned `Ok`, so a rejected transition never mutates anything.
//!
//! ```text
//! Empty --plant--> Growing --advance_day (reaches 0)--> Ready --harvest--> Empty
//!                  Growing --water (cap-limited)--> Growing
//! ```

use farmstead_types::{PlantDef, PlantId, Plot, PlotState};

use crate::error::InvalidState;

/// Sow `plant` into an empty plot.
pub fn sow(plot: &Plot, plant: &PlantDef) -> Result<PlotState, InvalidState> {
    match plot.state {
        PlotState::Empty => Ok(PlotState::Growing {
            plant: plant.id,
            growth_time_left: plant.base_growth_time,
            times_watered: 0,
        }),
        other => Err(InvalidState::PlotNotEmpty {
            plot: plot.id,
            status: other.status(),
        }),
    }
}

/// Water a growing crop.
///
/// Subtracts `water_effect_per_time` from the remaining growth, floored at
/// zero, and counts the watering. Reaching zero does not ripen the crop;
/// only [`advance_day`] does that.
pub fn water(plot: &Plot, plant: &PlantDef) -> Result<PlotState, InvalidState> {
    let PlotState::Growing {
        plant: planted,
        growth_time_left,
        times_watered,
    } = plot.state
    else {
        return Err(InvalidState::PlotNotGrowing {
            plot: plot.id,
            status: plot.state.status(),
        });
    };
    if times_watered >= plant.max_water_times {
        return Err(InvalidState::WaterLimitReached {
            plot: plot.id,
            max_water_times: plant.max_water_times,
        });
    }
    Ok(PlotState::Growing {
        plant: planted,
        growth_time_left: growth_time_left.saturating_sub(plant.water_effect_per_time),
        times_watered: times_watered.saturating_add(1),
    })
}

/// One day of growth for a single plot.
///
/// Returns `None` for plots that are not growing. A growing plot loses one
/// tick (floored at zero) and becomes [`PlotState::Ready`] once nothing is
/// left, including a plot that was already at zero from watering.
pub const fn advance_day(state: PlotState) -> Option<PlotState> {
    match state {
        PlotState::Growing {
            plant,
            growth_time_left,
            times_watered,
        } => {
            let left = growth_time_left.saturating_sub(1);
            if left == 0 {
                Some(PlotState::Ready {
                    plant,
                    times_watered,
                })
            } else {
                Some(PlotState::Growing {
                    plant,
                    growth_time_left: left,
                    times_watered,
                })
            }
        }
        PlotState::Empty | PlotState::Ready { .. } => None,
    }
}

/// Take the crop from a ready plot, returning what was planted.
///
/// The caller resets the plot to [`PlotState::Empty`].
pub fn reap(plot: &Plot) -> Result<PlantId, InvalidState> {
    match plot.state {
        PlotState::Ready { plant, .. } => Ok(plant),
        other => Err(InvalidState::PlotNotReady {
            plot: plot.id,
            status: other.status(),
        }),
    }
}
