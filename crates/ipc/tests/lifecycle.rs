// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{sync::Arc, thread};

use reifydb_ipc::{ColumnMetadata, TableView, export_ipc, import_ipc};
use reifydb_testing::DeviceFixture;

fn nested_table(fixture: &DeviceFixture) -> (TableView, Vec<ColumnMetadata>) {
	let tags = fixture.list(&[0, 2, 3], fixture.strings(&["a", "b", "c"]));
	let table = TableView::new(vec![fixture.nullable_int64(&[Some(1), None]), tags]);
	let metadata = table.iter().map(ColumnMetadata::unnamed_for).collect();
	(table, metadata)
}

#[test]
fn test_release_is_idempotent() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let (table, metadata) = nested_table(&fixture);
	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();

	let (_view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	let opened = runtime.stats().opened;

	for column in &columns {
		column.release().unwrap();
		column.release().unwrap();
		assert_eq!(column.open_handles(), 0);
		assert!(column.data().is_none());
	}
	assert_eq!(runtime.stats().closed, opened);

	drop(columns);
	assert_eq!(runtime.stats().closed, opened);
}

#[test]
fn test_release_cascades_to_children() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let (table, metadata) = nested_table(&fixture);
	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();

	let (_view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	let tags = &columns[1];
	// offsets, then strings: offsets + chars
	assert_eq!(tags.open_handles(), 3);

	tags.release().unwrap();
	let strings = tags.child(1).unwrap();
	assert_eq!(strings.open_handles(), 0);
	assert!(strings.child(1).unwrap().data().is_none());
	assert_eq!(columns[0].open_handles(), 2);
}

#[test]
fn test_dropping_the_list_closes_everything() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let (table, metadata) = nested_table(&fixture);
	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();

	let (view, columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	assert_eq!(runtime.stats().open_mappings, 5);
	assert_eq!(view.num_rows(), 2);

	let kept = columns[0].clone();
	drop(columns);
	assert_eq!(runtime.stats().open_mappings, 2);

	drop(kept);
	let stats = runtime.stats();
	assert_eq!(stats.open_mappings, 0);
	assert_eq!(stats.opened, stats.closed);
}

#[test]
fn test_repeated_imports_map_independently() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let (table, metadata) = nested_table(&fixture);
	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();

	let (first, first_columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	let (second, second_columns) = import_ipc(runtime.clone(), &buffer).unwrap();
	assert_eq!(first, second);
	assert_eq!(runtime.stats().open_mappings, 10);

	drop(first_columns);
	assert_eq!(runtime.stats().open_mappings, 5);
	assert_eq!(fixture.read_i64(second.column(0).unwrap()).unwrap(), vec![1, 0]);
	drop(second_columns);
	assert_eq!(runtime.stats().open_mappings, 0);
}

#[test]
fn test_concurrent_imports() {
	let fixture = DeviceFixture::new();
	let runtime = fixture.runtime().clone();
	let (table, metadata) = nested_table(&fixture);
	let buffer = export_ipc(&*runtime, &table, &metadata).unwrap();

	let workers: Vec<_> = (0..8)
		.map(|_| {
			let runtime = runtime.clone();
			let buffer = buffer.clone();
			let expected = table.clone();
			thread::spawn(move || {
				let (view, columns) = import_ipc(runtime, &buffer).unwrap();
				assert_eq!(view, expected);
				columns
			})
		})
		.collect();

	let mut held = Vec::new();
	for worker in workers {
		held.push(worker.join().unwrap());
	}
	assert_eq!(runtime.stats().open_mappings, 8 * 5);

	let columns: Vec<_> = held.into_iter().flatten().collect();
	let handles = columns.iter().map(Arc::clone);
	thread::scope(|scope| {
		for column in handles {
			scope.spawn(move || column.release().unwrap());
		}
	});
	assert_eq!(runtime.stats().open_mappings, 0);
	assert_eq!(runtime.stats().opened, runtime.stats().closed);
}
