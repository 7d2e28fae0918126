//! EventKit bridge script
//!
//! Run as `osascript -l JavaScript -e SCRIPT <request-json>`. The script
//! returns one JSON object, `{"ok": true, "result": ...}` on success or
//! `{"ok": false, "error": "..."}` on failure, which `osascript` prints to
//! stdout.

/// JavaScript for Automation source of the bridge
pub const EVENTKIT_BRIDGE: &str = r#"
ObjC.import('EventKit');
ObjC.import('Foundation');

var store = $.EKEventStore.alloc.init;

function pump(isDone, seconds) {
  var deadline = $.NSDate.dateWithTimeIntervalSinceNow(seconds);
  while (!isDone() && deadline.timeIntervalSinceNow > 0) {
    $.NSRunLoop.currentRunLoop.runUntilDate($.NSDate.dateWithTimeIntervalSinceNow(0.1));
  }
  return isDone();
}

function requestAccess(timeout) {
  var state = { done: false, granted: false };
  var handler = function (granted, error) {
    state.granted = !!granted;
    state.done = true;
  };
  if (store.respondsToSelector('requestFullAccessToRemindersWithCompletion:')) {
    store.requestFullAccessToRemindersWithCompletion(handler);
  } else {
    store.requestAccessToEntityTypeCompletion($.EKEntityTypeReminder, handler);
  }
  pump(function () { return state.done; }, timeout);
  return state.granted;
}

function findList(name) {
  var calendars = store.calendarsForEntityType($.EKEntityTypeReminder);
  for (var i = 0; i < calendars.count; i++) {
    var cal = calendars.objectAtIndex(i);
    if (cal.title.js === name) {
      return cal;
    }
  }
  var created = $.EKCalendar.calendarForEntityTypeEventStore($.EKEntityTypeReminder, store);
  created.title = name;
  created.source = store.defaultCalendarForNewReminders.source;
  if (!store.saveCalendarCommitError(created, true, $())) {
    throw new Error('cannot create reminders list ' + name);
  }
  return created;
}

function pad(n) {
  return (n < 10 ? '0' : '') + n;
}

function isoString(date) {
  var formatter = $.NSISO8601DateFormatter.alloc.init;
  return formatter.stringFromDate(date).js;
}

function encodeDue(c) {
  if (!c || c.isNil()) {
    return null;
  }
  var due = { date: c.year + '-' + pad(c.month) + '-' + pad(c.day), time: null };
  var hour = c.hour;
  var minute = c.minute;
  if (hour >= 0 && hour < 24 && minute >= 0 && minute < 60 && (hour !== 0 || minute !== 0)) {
    due.time = pad(hour) + ':' + pad(minute);
  }
  return due;
}

function decodeDue(due) {
  var c = $.NSDateComponents.alloc.init;
  var parts = due.date.split('-');
  c.year = parseInt(parts[0], 10);
  c.month = parseInt(parts[1], 10);
  c.day = parseInt(parts[2], 10);
  if (due.time) {
    var hm = due.time.split(':');
    c.hour = parseInt(hm[0], 10);
    c.minute = parseInt(hm[1], 10);
  }
  return c;
}

function encodeItem(r) {
  var tags = [];
  if (r.respondsToSelector('hashtagTexts')) {
    var raw = r.hashtagTexts;
    if (raw && !raw.isNil()) {
      for (var i = 0; i < raw.count; i++) {
        tags.push(raw.objectAtIndex(i).js);
      }
    }
  }
  return {
    id: r.calendarItemIdentifier.js,
    title: r.title.isNil() ? '' : r.title.js,
    due: encodeDue(r.dueDateComponents),
    notes: r.notes.isNil() ? null : r.notes.js,
    url: r.URL.isNil() ? null : r.URL.absoluteString.js,
    completed: !!r.completed,
    last_modified: r.lastModifiedDate.isNil() ? null : isoString(r.lastModifiedDate),
    tags: tags
  };
}

function findItem(id) {
  var item = store.calendarItemWithIdentifier(id);
  if (!item || item.isNil() || !item.isKindOfClass($.EKReminder)) {
    return null;
  }
  return item;
}

function requireItem(id) {
  var item = findItem(id);
  if (!item) {
    throw new Error('no reminder with id ' + id);
  }
  return item;
}

function save(r) {
  if (!store.saveReminderCommitError(r, true, $())) {
    throw new Error('failed to save reminder');
  }
}

function listItems(list) {
  var cal = findList(list);
  var predicate = store.predicateForRemindersInCalendars($([cal]));
  var state = { done: false, items: null };
  store.fetchRemindersMatchingPredicateCompletion(predicate, function (reminders) {
    state.items = reminders;
    state.done = true;
  });
  if (!pump(function () { return state.done; }, 30)) {
    throw new Error('timed out fetching reminders');
  }
  var out = [];
  if (state.items && !state.items.isNil()) {
    for (var i = 0; i < state.items.count; i++) {
      out.push(encodeItem(state.items.objectAtIndex(i)));
    }
  }
  return out;
}

function createItem(req) {
  var r = $.EKReminder.reminderWithEventStore(store);
  r.title = req.title;
  r.calendar = findList(req.list);
  if (req.notes) {
    r.notes = req.notes;
  }
  if (req.url) {
    r.URL = $.NSURL.URLWithString(req.url);
  }
  if (req.due) {
    r.dueDateComponents = decodeDue(req.due);
  }
  if (req.tag && r.respondsToSelector('setHashtagTexts:')) {
    r.setHashtagTexts($([req.tag]));
  }
  save(r);
  return encodeItem(r);
}

function updateItem(req) {
  var r = requireItem(req.id);
  if (req.title !== null && req.title !== undefined) {
    r.title = req.title;
  }
  if (req.clear_due) {
    r.dueDateComponents = $();
  } else if (req.due) {
    r.dueDateComponents = decodeDue(req.due);
  }
  save(r);
  return null;
}

function dispatch(req) {
  switch (req.op) {
    case 'request_access':
      return requestAccess(req.timeout_secs);
    case 'list_items':
      return listItems(req.list);
    case 'create_item':
      return createItem(req);
    case 'update_item':
      return updateItem(req);
    case 'complete_item': {
      var done = requireItem(req.id);
      done.completed = true;
      save(done);
      return null;
    }
    case 'delete_item': {
      var gone = requireItem(req.id);
      if (!store.removeReminderCommitError(gone, true, $())) {
        throw new Error('failed to delete reminder');
      }
      return null;
    }
    case 'get_item': {
      var found = findItem(req.id);
      return found ? encodeItem(found) : null;
    }
    case 'set_url': {
      var linked = requireItem(req.id);
      linked.URL = $.NSURL.URLWithString(req.url);
      save(linked);
      return null;
    }
    default:
      throw new Error('unknown operation ' + req.op);
  }
}

function run(argv) {
  try {
    var request = JSON.parse(argv[0]);
    return JSON.stringify({ ok: true, result: dispatch(request) });
  } catch (e) {
    return JSON.stringify({ ok: false, error: String(e && e.message ? e.message : e) });
  }
}
"#;
