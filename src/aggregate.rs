use crate::api::{Session, Transport};
use crate::error::ZabbixError;
use crate::model::{Aggregate, TrendSample};
use crate::protocol::{TrendGetParams, TrendRow};
use crate::units::ValueScale;

fn min_or_none(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, value| {
        Some(acc.map_or(value, |current| current.min(value)))
    })
}

fn max_or_none(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc: Option<f64>, value| {
        Some(acc.map_or(value, |current| current.max(value)))
    })
}

fn avg_or_none(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0u64;
    for value in values {
        total += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Trend buckets for `item_ids` between two epoch seconds.
pub fn fetch_trends<T: Transport>(
    session: &Session<T>,
    item_ids: &[String],
    time_from: i64,
    time_till: i64,
) -> Result<Vec<TrendSample>, ZabbixError> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<TrendRow> = session.call(
        "trend.get",
        &TrendGetParams {
            output: &[
                "itemid",
                "clock",
                "num",
                "value_min",
                "value_avg",
                "value_max",
            ],
            itemids: item_ids,
            time_from,
            time_till,
        },
    )?;
    Ok(rows
        .into_iter()
        .map(|row| TrendSample {
            item_id: row.itemid,
            clock: row.clock,
            count: row.num,
            min: row.value_min,
            avg: row.value_avg,
            max: row.value_max,
        })
        .collect())
}

/// Reduce trend buckets to one min/avg/max triple.
///
/// `min` is the smallest bucket minimum, `max` the largest bucket maximum and
/// `avg` the plain mean of bucket averages. Bucket sample counts are not used
/// as weights. Scaling is applied to each bucket before reduction.
pub fn aggregate(samples: &[TrendSample], scale: ValueScale) -> Aggregate {
    Aggregate {
        min: min_or_none(samples.iter().map(|s| scale.apply(s.min))),
        avg: avg_or_none(samples.iter().map(|s| scale.apply(s.avg))),
        max: max_or_none(samples.iter().map(|s| scale.apply(s.max))),
    }
}
