// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_ipc::{
	ColumnMetadata, ColumnView, DataType, DevicePtr, DeviceRuntime, IpcContext, TableView, export_ipc, import_ipc,
};
use reifydb_testing::{DeviceFixture, init_tracing};

#[test]
fn test_nullable_and_nested_columns() {
	init_tracing();
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();

	let amounts = fixture.nullable_int64(&[Some(10), None, Some(30)]);
	let point = fixture.structure(vec![fixture.float64(&[0.5, 1.5, 2.5])]);
	let table = TableView::new(vec![amounts, point]);
	let metadata = vec![
		ColumnMetadata::new("amount"),
		ColumnMetadata::new("point").with_children(vec![ColumnMetadata::new("x")]),
	];

	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();
	assert!(!buffer.is_empty());

	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	assert_eq!(view.num_columns(), 2);
	assert_eq!(columns.len(), 2);

	let amount = view.column(0).unwrap();
	assert!(amount.null_mask().is_some());
	assert_eq!(amount.null_count(), 1);
	assert_eq!(fixture.read_i64(amount).unwrap(), vec![10, 0, 30]);
	assert_eq!(fixture.read_validity(amount).unwrap(), vec![true, false, true]);

	let point = view.column(1).unwrap();
	assert_eq!(point.num_children(), 1);
	assert_eq!(point.child(0).unwrap().size(), point.size());
	assert_eq!(fixture.read_f64(point.child(0).unwrap()).unwrap(), vec![0.5, 1.5, 2.5]);

	assert_eq!(columns[0].name(), "amount");
	assert_eq!(columns[1].name(), "point");
	assert_eq!(columns[1].child(0).unwrap().name(), "x");
	assert_eq!(view, table);
}

#[test]
fn test_every_buffer_gets_one_handle() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();

	// amount: data + mask, name: offsets + chars
	let table =
		TableView::new(vec![fixture.nullable_int64(&[Some(1), None]), fixture.strings(&["left", "right"])]);
	let metadata = vec![
		ColumnMetadata::new("amount"),
		ColumnMetadata::new("name").with_children(vec![ColumnMetadata::new("offsets"), ColumnMetadata::new("chars")]),
	];

	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();
	assert_eq!(runtime.stats().exported, 4);

	let (_view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	assert_eq!(columns.iter().map(|c| c.open_handles()).sum::<usize>(), 4);
	assert_eq!(runtime.stats().opened, 4);
	assert_eq!(runtime.stats().open_mappings, 4);
}

#[test]
fn test_strings() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let table = TableView::new(vec![fixture.strings(&["alpha", "", "gamma"])]);
	let metadata = vec![ColumnMetadata::unnamed_for(table.column(0).unwrap())];

	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();
	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	assert_eq!(fixture.read_strings(view.column(0).unwrap()).unwrap(), vec!["alpha", "", "gamma"]);
	assert_eq!(columns[0].children().len(), 2);
	assert!(columns[0].data().is_none());
}

#[test]
fn test_two_levels_of_nesting() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();

	// [[1, 2], [3]], [[4, 5, 6]]
	let inner = fixture.list(&[0, 2, 3, 6], fixture.int32(&[1, 2, 3, 4, 5, 6]));
	let outer = fixture.list(&[0, 2, 3], inner);
	let table = TableView::new(vec![outer]);
	let metadata = vec![ColumnMetadata::new("matrix").with_children(vec![
		ColumnMetadata::new("offsets"),
		ColumnMetadata::new("rows").with_children(vec![
			ColumnMetadata::new("offsets"),
			ColumnMetadata::new("values"),
		]),
	])];

	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();
	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	let outer = view.column(0).unwrap();
	assert_eq!(outer.data_type(), DataType::List);
	assert_eq!(outer.size(), 2);
	let inner = outer.child(1).unwrap();
	assert_eq!(inner.size(), 3);
	assert_eq!(fixture.read_i32(inner.child(0).unwrap()).unwrap(), vec![0, 2, 3, 6]);
	assert_eq!(fixture.read_i32(inner.child(1).unwrap()).unwrap(), vec![1, 2, 3, 4, 5, 6]);

	let rows = columns[0].child(1).unwrap();
	assert_eq!(rows.name(), "rows");
	assert_eq!(rows.child(1).unwrap().name(), "values");
	assert_eq!(columns[0].open_handles(), 3);
}

#[test]
fn test_struct_with_mixed_fields() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let record = fixture.structure(vec![fixture.int64(&[7, 8]), fixture.strings(&["a", "bc"])]);
	let table = TableView::new(vec![record]);
	let metadata = vec![ColumnMetadata::unnamed_for(table.column(0).unwrap())];

	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();
	let (view, _columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	let record = view.column(0).unwrap();
	assert_eq!(record.data_type(), DataType::Struct);
	assert_eq!(fixture.read_i64(record.child(0).unwrap()).unwrap(), vec![7, 8]);
	assert_eq!(fixture.read_strings(record.child(1).unwrap()).unwrap(), vec!["a", "bc"]);
}

#[test]
fn test_decimal_keeps_scale() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let table = TableView::new(vec![fixture.decimal64(&[12345, -500], -2)]);

	let buffer = export_ipc(&*runtime, &table, &[ColumnMetadata::new("price")]).unwrap();
	let (view, _columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	let price = view.column(0).unwrap();
	assert_eq!(
		price.data_type(),
		DataType::Decimal64 {
			scale: -2
		}
	);
	assert_eq!(fixture.read_i64(price).unwrap(), vec![12345, -500]);
}

#[test]
fn test_sliced_column_keeps_offset() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let full = fixture.int32(&[1, 2, 3, 4, 5]);
	let sliced = ColumnView::new(DataType::Int32, 3, full.head()).with_offset(2);
	let table = TableView::new(vec![sliced]);

	let buffer = export_ipc(&*runtime, &table, &[ColumnMetadata::new("tail")]).unwrap();
	let (view, _columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	let tail = view.column(0).unwrap();
	assert_eq!(tail.offset(), 2);
	assert_eq!(fixture.read_i32(tail).unwrap(), vec![3, 4, 5]);
}

#[test]
fn test_interior_pointer_is_exported_with_its_offset() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let full = fixture.int64(&[1, 2, 3, 4]);
	let interior = ColumnView::new(DataType::Int64, 2, full.head().offset(16));
	let table = TableView::new(vec![interior]);

	let buffer = export_ipc(&*runtime, &table, &[ColumnMetadata::new("half")]).unwrap();
	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	assert_eq!(fixture.read_i64(view.column(0).unwrap()).unwrap(), vec![3, 4]);
	assert_eq!(columns[0].data(), Some(full.head().offset(16)));
}

#[test]
fn test_empty_table() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();

	let buffer = export_ipc(&*runtime, &TableView::empty(), &[]).unwrap();
	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	assert_eq!(view.num_columns(), 0);
	assert!(columns.is_empty());
	assert_eq!(runtime.stats().opened, 0);
}

#[test]
fn test_zero_row_column_has_no_data() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let table = TableView::new(vec![ColumnView::new(DataType::Float32, 0, DevicePtr::null())]);

	let buffer = export_ipc(&*runtime, &table, &[ColumnMetadata::new("nothing")]).unwrap();
	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();

	assert_eq!(view.column(0).unwrap().size(), 0);
	assert!(view.column(0).unwrap().data().is_none());
	assert_eq!(columns[0].open_handles(), 0);
}

#[test]
fn test_context_shares_runtime() {
	let fixture = DeviceFixture::new();
	let context = IpcContext::new(fixture.runtime().clone());
	let table = TableView::new(vec![fixture.int32(&[4, 2])]);

	let buffer = context.export(&table, &[ColumnMetadata::new("n")]).unwrap();
	let (view, columns) = context.import(&buffer).unwrap();

	assert_eq!(context.runtime().name(), "host");
	assert_eq!(fixture.read_i32(view.column(0).unwrap()).unwrap(), vec![4, 2]);
	drop(columns);
	assert_eq!(fixture.runtime().stats().open_mappings, 0);
}
