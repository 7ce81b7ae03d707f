use super::element::TrackElement;

/// Largest allowed ratio between a cant tangent and the cant change of its
/// interval. Beyond it the Hermite segment would overshoot.
pub const MAX_TANGENT_RATIO: f64 = 3.0;

/// Fills `curve_cant_tangent` from the cant sequence.
///
/// Tangents start as centered differences, are zeroed around flat intervals
/// and are scaled back wherever they would overshoot.
pub fn compute_cant_tangents(elements: &mut [TrackElement]) {
    match elements.len() {
        0 => return,
        1 => {
            elements[0].curve_cant_tangent = 0.0;
            return;
        }
        _ => {}
    }

    let deltas: Vec<f64> = elements
        .windows(2)
        .map(|w| w[1].curve_cant - w[0].curve_cant)
        .collect();

    let n = elements.len();
    let mut tangents = vec![0.0; n];
    tangents[0] = deltas[0];
    tangents[n - 1] = deltas[n - 2];
    for i in 1..n - 1 {
        tangents[i] = 0.5 * (deltas[i - 1] + deltas[i]);
    }

    let limit = MAX_TANGENT_RATIO * MAX_TANGENT_RATIO;
    for (i, &delta) in deltas.iter().enumerate() {
        if delta == 0.0 {
            tangents[i] = 0.0;
            tangents[i + 1] = 0.0;
            continue;
        }
        let a = tangents[i] / delta;
        let b = tangents[i + 1] / delta;
        let norm = a * a + b * b;
        if norm > limit {
            let t = MAX_TANGENT_RATIO / norm.sqrt();
            tangents[i] = t * a * delta;
            tangents[i + 1] = t * b * delta;
        }
    }

    for (element, tangent) in elements.iter_mut().zip(tangents) {
        element.curve_cant_tangent = tangent;
    }
}
