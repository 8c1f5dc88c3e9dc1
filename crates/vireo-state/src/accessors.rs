//! External-protocol accessor generation.
//!
//! For each protocol direction the block's flags enable, this module
//! registers the corresponding entry points: the mapping layer gets the
//! block's canonical setter/getter family names, and the routing layer
//! gets one handler per route in the block's [`RouteTable`]. A disabled
//! direction registers nothing, so unintended external mutation is
//! impossible by construction.
//!
//! Handlers share the block through `Rc<RefCell<BlockCore>>`. Getter
//! handlers return a [`Reply`] on the route derived from the getter's
//! canonical name; the routing layer dispatches it back to the
//! originating peer after the handler returns.

use std::cell::RefCell;
use std::rc::Rc;

use vireo_core::error::AccessError;
use vireo_core::{
    AccessFlags, Granularity, MappingLayer, Reply, ReplyArg, RouteBinding, RouteKey, RouteScope,
    RouteTable, RoutingLayer, Schema, Shape,
};

use crate::block::BlockCore;

const GRANULARITIES: [Granularity; 4] = [
    Granularity::Idx,
    Granularity::Row,
    Granularity::Col,
    Granularity::All,
];

/// Register every accessor the flags enable.
pub(crate) fn generate(
    core: &Rc<RefCell<BlockCore>>,
    routes: &RouteTable,
    schema: &Schema,
    shape: &Shape,
    flags: AccessFlags,
    mapping: Option<&mut dyn MappingLayer>,
    routing: Option<&mut dyn RoutingLayer>,
) {
    if let (Some(layer), Some(access)) = (mapping, flags.mapping) {
        if access.set() {
            layer.add_instance(routes.setter_name());
        }
        if access.get() {
            layer.add_instance(routes.getter_name());
        }
    }

    let (layer, access) = match (routing, flags.routing) {
        (Some(layer), Some(access)) => (layer, access),
        _ => return,
    };

    if access.set() {
        register_setters(core, routes, schema, shape, layer);
    }
    if access.get() {
        register_getters(core, routes, schema, shape, layer);
    }
}

fn register_setters(
    core: &Rc<RefCell<BlockCore>>,
    routes: &RouteTable,
    schema: &Schema,
    shape: &Shape,
    layer: &mut dyn RoutingLayer,
) {
    let randomise = route_of(routes, &RouteKey::Randomise);
    let c = Rc::clone(core);
    layer.register(
        RouteBinding {
            route: randomise,
            coord_args: 0,
            payload_len: 0,
        },
        Box::new(move |_coords, _payload| c.borrow_mut().randomize().map(|()| None)),
    );

    for gran in GRANULARITIES {
        if matches!(gran, Granularity::Row | Granularity::Col) && !shape.is_matrix() {
            continue;
        }
        let route = route_of(
            routes,
            &RouteKey::Set {
                scope: RouteScope::Block,
                gran,
            },
        );
        let c = Rc::clone(core);
        let handler: vireo_core::RouteHandler = match gran {
            Granularity::Idx => Box::new(move |coords, payload| {
                let coord = coords_to_index(coords)?;
                c.borrow_mut().set_idx(&coord, payload).map(|()| None)
            }),
            Granularity::Row => Box::new(move |coords, payload| {
                let row = one_coord(coords)?;
                c.borrow_mut().set_row(row, payload).map(|()| None)
            }),
            Granularity::Col => Box::new(move |coords, payload| {
                let col = one_coord(coords)?;
                c.borrow_mut().set_col(col, payload).map(|()| None)
            }),
            Granularity::All => Box::new(move |_coords, payload| {
                c.borrow_mut().set_all(payload).map(|()| None)
            }),
        };
        layer.register(
            RouteBinding {
                route,
                coord_args: coord_args(gran, shape),
                payload_len: block_payload_len(gran, schema, shape),
            },
            handler,
        );
    }

    for (attr, def) in schema.iter() {
        let lanes = def.slots_per_instance();
        for gran in GRANULARITIES {
            if matches!(gran, Granularity::Row | Granularity::Col) && !shape.is_matrix() {
                continue;
            }
            let route = route_of(
                routes,
                &RouteKey::Set {
                    scope: RouteScope::Attr(attr.to_string()),
                    gran,
                },
            );
            let c = Rc::clone(core);
            let a = attr.to_string();
            let handler: vireo_core::RouteHandler = match gran {
                Granularity::Idx => Box::new(move |coords, payload| {
                    let coord = coords_to_index(coords)?;
                    c.borrow_mut().set_attr_idx(&a, &coord, payload).map(|()| None)
                }),
                Granularity::Row => Box::new(move |coords, payload| {
                    let row = one_coord(coords)?;
                    c.borrow_mut().set_attr_row(&a, row, payload).map(|()| None)
                }),
                Granularity::Col => Box::new(move |coords, payload| {
                    let col = one_coord(coords)?;
                    c.borrow_mut().set_attr_col(&a, col, payload).map(|()| None)
                }),
                Granularity::All => Box::new(move |_coords, payload| {
                    c.borrow_mut().set_attr_all(&a, payload).map(|()| None)
                }),
            };
            layer.register(
                RouteBinding {
                    route,
                    coord_args: coord_args(gran, shape),
                    payload_len: attr_payload_len(gran, lanes, shape),
                },
                handler,
            );
        }
    }
}

fn register_getters(
    core: &Rc<RefCell<BlockCore>>,
    routes: &RouteTable,
    schema: &Schema,
    shape: &Shape,
    layer: &mut dyn RoutingLayer,
) {
    for (attr, _) in schema.iter() {
        let route = route_of(
            routes,
            &RouteKey::Get {
                attr: attr.to_string(),
            },
        );
        let reply_route = route.reply_route();
        let c = Rc::clone(core);
        let a = attr.to_string();
        layer.register(
            RouteBinding {
                route,
                coord_args: shape.dims().len() as u8,
                payload_len: 0,
            },
            Box::new(move |coords, _payload| {
                let coord = coords_to_index(coords)?;
                let lanes = c.borrow_mut().get(&coord, &a)?;
                let mut args = Vec::with_capacity(lanes.len() + 1);
                args.push(ReplyArg::Str(a.clone()));
                args.extend(lanes.into_iter().map(ReplyArg::Float));
                Ok(Some(Reply {
                    route: reply_route.clone(),
                    args,
                }))
            }),
        );
    }
}

/// The table contains every key it was built from; a miss here is a
/// construction bug, not a runtime condition.
fn route_of(routes: &RouteTable, key: &RouteKey) -> vireo_core::RouteId {
    routes
        .route(key)
        .unwrap_or_else(|| unreachable!("route table missing {key:?}"))
        .clone()
}

fn coord_args(gran: Granularity, shape: &Shape) -> u8 {
    match gran {
        Granularity::Idx => shape.dims().len() as u8,
        Granularity::Row | Granularity::Col => 1,
        Granularity::All => 0,
    }
}

fn block_payload_len(gran: Granularity, schema: &Schema, shape: &Shape) -> usize {
    let spi = schema.slots_per_instance();
    match gran {
        Granularity::Idx => spi,
        Granularity::Row => shape.cols().unwrap_or(1) * spi,
        Granularity::Col => shape.rows().unwrap_or(1) * spi,
        Granularity::All => shape.instance_count() * spi,
    }
}

fn attr_payload_len(gran: Granularity, lanes: usize, shape: &Shape) -> usize {
    match gran {
        Granularity::Idx => lanes,
        Granularity::Row => shape.cols().unwrap_or(1) * lanes,
        Granularity::Col => shape.rows().unwrap_or(1) * lanes,
        Granularity::All => shape.instance_count() * lanes,
    }
}

fn coords_to_index(coords: &[i32]) -> Result<Vec<usize>, AccessError> {
    coords
        .iter()
        .map(|&c| {
            usize::try_from(c).map_err(|_| AccessError::OutOfBounds {
                index: coords.to_vec(),
            })
        })
        .collect()
}

fn one_coord(coords: &[i32]) -> Result<usize, AccessError> {
    match coords {
        [c] => usize::try_from(*c).map_err(|_| AccessError::OutOfBounds {
            index: coords.to_vec(),
        }),
        _ => Err(AccessError::OutOfBounds {
            index: coords.to_vec(),
        }),
    }
}
