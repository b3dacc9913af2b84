use crate::cartesian::NewCartesianPoint2d;
use crate::error::LayerscopeTypesError;
use crate::geo::traits::point::NewGeoPoint;
use crate::geo::traits::projection::Projection;
use geodesy::prelude::*;
use std::marker::PhantomData;

/// Projection given by a [geodesy](https://docs.rs/geodesy) operator definition, e.g. `"utm zone=36"`.
pub struct GeodesyProjection<In, Out> {
    definition: String,
    context: Minimal,
    op: OpHandle,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> GeodesyProjection<In, Out> {
    /// Creates a projection from the operator definition.
    pub fn new(definition: &str) -> Result<Self, LayerscopeTypesError> {
        let mut context = Minimal::new();
        let op = context.op(definition).map_err(|err| {
            LayerscopeTypesError::ProjectionDefinition(format!("{definition}: {err}"))
        })?;
        Ok(Self {
            definition: definition.to_string(),
            context,
            op,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        })
    }

    /// Operator definition the projection was created from.
    pub fn definition(&self) -> &str {
        &self.definition
    }
}

impl<In, Out> std::fmt::Debug for GeodesyProjection<In, Out> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeodesyProjection")
            .field("definition", &self.definition)
            .finish()
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for GeodesyProjection<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(Out::new(data[0].0[0], data[0].0[1]))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        Some(In::latlon(
            data[0].0[1].to_degrees(),
            data[0].0[0].to_degrees(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;
    use crate::geo::impls::GeoPoint2d;
    use crate::geo::GeoPoint;
    use crate::latlon;
    use approx::assert_abs_diff_eq;

    #[test]
    fn utm_round_trip() {
        let projection: GeodesyProjection<GeoPoint2d, Point2d> =
            GeodesyProjection::new("utm zone=36").expect("valid definition");
        let point = latlon!(32.08, 34.78);
        let projected = projection.project(&point).expect("projectable");
        let unprojected = projection.unproject(&projected).expect("unprojectable");

        assert_abs_diff_eq!(unprojected.lat(), point.lat(), epsilon = 1e-6);
        assert_abs_diff_eq!(unprojected.lon(), point.lon(), epsilon = 1e-6);
    }

    #[test]
    fn rejects_unknown_operator() {
        let result: Result<GeodesyProjection<GeoPoint2d, Point2d>, _> =
            GeodesyProjection::new("no_such_operator");
        assert!(result.is_err());
    }
}
