use crate::models::{DashboardResponse, QUICK_AMOUNTS};

pub fn render_index(dashboard: &DashboardResponse) -> String {
    let quick_buttons = QUICK_AMOUNTS
        .iter()
        .map(|amount| {
            format!(
                r#"<form class="quick-form" method="post" action="/intake/add"><input type="hidden" name="amount" value="{amount}" /><button class="quick-button" type="submit" data-amount="{amount}">{amount} ml</button></form>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n        ");

    INDEX_HTML
        .replace("{{DATE}}", &dashboard.date)
        .replace("{{TOTAL_LITERS}}", &format!("{:.2}", dashboard.today_total as f64 / 1000.0))
        .replace("{{GOAL_LITERS}}", &dashboard.goal_liters)
        .replace("{{PROGRESS}}", &dashboard.progress.to_string())
        .replace("{{REMAINING}}", &dashboard.remaining.to_string())
        .replace("{{QUICK_BUTTONS}}", &quick_buttons)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Hydrate+</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #e8f4fb;
      --bg-2: #a7d3f5;
      --ink: #1f2b33;
      --accent: #2a8bd8;
      --accent-2: #1d4d6b;
      --danger: #c63b2b;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(29, 77, 107, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #d9efff 60%, #f1f8fd 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .hero {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      gap: 18px;
    }

    .summary-card {
      background: white;
      border-radius: 18px;
      padding: 18px 24px;
      text-align: center;
      border: 1px solid rgba(29, 77, 107, 0.08);
    }

    .summary-value {
      font-size: 2rem;
      font-weight: 600;
      color: var(--accent);
    }

    .progress-info {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .progress-bar {
      height: 16px;
      border-radius: 999px;
      background: rgba(29, 77, 107, 0.1);
      overflow: hidden;
      margin: 12px 0 8px;
    }

    .progress-fill {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    .progress-stats {
      display: flex;
      justify-content: space-between;
      color: #5f6b73;
    }

    .quick-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
      margin-bottom: 12px;
    }

    .quick-form {
      margin: 0;
    }

    .manual-entry,
    .settings-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: #4a5760;
    }

    input[type="number"],
    input[type="time"] {
      padding: 12px 14px;
      border-radius: 12px;
      border: 1px solid rgba(29, 77, 107, 0.2);
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      width: 100%;
    }

    .quick-button,
    .primary {
      background: var(--accent);
      color: white;
    }

    .secondary {
      background: rgba(29, 77, 107, 0.1);
      color: var(--accent-2);
      width: auto;
    }

    .danger {
      background: var(--danger);
      color: white;
      width: auto;
    }

    .notification-toggle {
      display: flex;
      align-items: center;
      gap: 10px;
      margin-top: 14px;
    }

    .hint {
      margin: 10px 0 0;
      color: #5f6b73;
      font-size: 0.9rem;
    }

    .hint.warning {
      color: var(--danger);
    }

    .history-header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .history-list {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    .history-list li {
      display: flex;
      justify-content: space-between;
      background: white;
      border-radius: 12px;
      padding: 10px 14px;
    }

    .status[data-type="error"] {
      color: var(--danger);
    }
  </style>
</head>
<body>
  <main class="app">
    <section class="hero">
      <div>
        <h1>Hydrate+</h1>
        <p>Pantau asupan air harian dan dapatkan pengingat otomatis agar tubuh tetap segar.</p>
      </div>
      <div class="summary-card">
        <div class="summary-value"><span id="total">{{TOTAL_LITERS}}</span> L</div>
        <span>Minum Hari Ini ({{DATE}})</span>
      </div>
    </section>

    <section>
      <div class="progress-info">
        <div>
          <h2>Target Harian</h2>
          <p><span id="goal">{{GOAL_LITERS}}</span> L</p>
        </div>
        <button class="secondary" id="recommend-btn" type="button">Rekomendasi 2.1L</button>
      </div>
      <div class="progress-bar">
        <div class="progress-fill" id="progress-fill" style="width: {{PROGRESS}}%"></div>
      </div>
      <div class="progress-stats">
        <span><span id="progress">{{PROGRESS}}</span>% tercapai</span>
        <span>Sisa <span id="remaining">{{REMAINING}}</span> ml</span>
      </div>
    </section>

    <section>
      <h2>Catat Minum</h2>
      <div class="quick-grid">
        {{QUICK_BUTTONS}}
      </div>
      <form class="manual-entry" id="manual-form">
        <input id="manual-amount" type="number" inputmode="numeric" placeholder="Jumlah (ml)" />
        <button class="primary" type="submit">Tambah</button>
      </form>
    </section>

    <section>
      <h2>Pengaturan Pengingat</h2>
      <div class="settings-grid">
        <label>Target harian (ml)
          <input id="daily-goal" type="number" min="500" step="100" />
        </label>
        <label>Interval pengingat (menit)
          <input id="reminder-interval" type="number" min="15" step="15" />
        </label>
        <label>Jam mulai aktif
          <input id="wake-start" type="time" />
        </label>
        <label>Jam selesai aktif
          <input id="wake-end" type="time" />
        </label>
      </div>
      <div class="notification-toggle">
        <input id="notification-toggle" type="checkbox" />
        <label for="notification-toggle">Aktifkan notifikasi desktop</label>
      </div>
      <p class="hint warning" id="notice" hidden></p>
      <p class="hint" id="next-reminder" hidden></p>
    </section>

    <section>
      <div class="history-header">
        <h2>Riwayat Hari Ini</h2>
        <button class="danger" id="reset-btn" type="button">Reset hari ini</button>
      </div>
      <p class="hint" id="history-empty">Belum ada catatan. Mulailah dengan menambahkan segelas air.</p>
      <ul class="history-list" id="history"></ul>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const supported = typeof window !== 'undefined' && 'Notification' in window;

    const setStatus = (message, type) => {
      $('status').textContent = message;
      $('status').dataset.type = type || '';
    };

    const render = (data) => {
      $('total').textContent = (data.todayTotal / 1000).toFixed(2);
      $('goal').textContent = data.goalLiters;
      $('progress').textContent = data.progress;
      $('progress-fill').style.width = `${data.progress}%`;
      $('remaining').textContent = data.remaining;

      const s = data.settings;
      if (document.activeElement !== $('daily-goal')) $('daily-goal').value = s.dailyGoal;
      if (document.activeElement !== $('reminder-interval')) $('reminder-interval').value = s.reminderInterval;
      $('wake-start').value = s.wakeStart;
      $('wake-end').value = s.wakeEnd;
      $('notification-toggle').checked = s.notificationsEnabled;

      $('notice').hidden = !data.notice;
      $('notice').textContent = data.notice || '';
      $('next-reminder').hidden = !data.nextReminderTime;
      $('next-reminder').innerHTML = data.nextReminderTime
        ? `Pengingat berikutnya pada <strong>${data.nextReminderTime}</strong>`
        : '';

      $('history-empty').hidden = data.history.length > 0;
      $('history').innerHTML = data.history
        .map((item) => `<li><span>${item.time}</span><strong>${item.amount} ml</strong></li>`)
        .join('');

      if (data.requestPermission) {
        requestPermission();
      }
    };

    const call = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: body === undefined ? {} : { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const act = (method, url, body) =>
      call(method, url, body)
        .then((data) => {
          render(data);
          setStatus('', '');
        })
        .catch((err) => setStatus(err.message, 'error'));

    const reportPermission = (permission) => act('POST', '/api/permission', { permission });

    let asking = false;
    const requestPermission = () => {
      if (!supported || asking || Notification.permission !== 'default') return;
      asking = true;
      Notification.requestPermission()
        .then((permission) => reportPermission(permission))
        .finally(() => {
          asking = false;
        });
    };

    const pollNotifications = () => {
      call('GET', '/api/notifications')
        .then((data) => {
          if (!supported || Notification.permission !== 'granted') return;
          data.notifications.forEach((n) => new Notification(n.title, { body: n.body, tag: n.tag }));
          if (data.notifications.length) {
            act('GET', '/api/state');
          }
        })
        .catch(() => {});
    };

    document.querySelectorAll('.quick-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const amount = Number(form.querySelector('button').dataset.amount);
        act('POST', '/api/intake', { amount });
      });
    });

    $('manual-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const amount = $('manual-amount').value;
      $('manual-amount').value = '';
      act('POST', '/api/intake', { amount });
    });

    $('daily-goal').addEventListener('change', (event) =>
      act('POST', '/api/settings', { dailyGoal: Number(event.target.value) }));
    $('reminder-interval').addEventListener('change', (event) =>
      act('POST', '/api/settings', { reminderInterval: Number(event.target.value) }));
    $('wake-start').addEventListener('change', (event) =>
      act('POST', '/api/settings', { wakeStart: event.target.value }));
    $('wake-end').addEventListener('change', (event) =>
      act('POST', '/api/settings', { wakeEnd: event.target.value }));
    $('notification-toggle').addEventListener('change', (event) =>
      act('POST', '/api/settings', { notificationsEnabled: event.target.checked }));

    $('recommend-btn').addEventListener('click', () => act('POST', '/api/settings/recommended'));

    $('reset-btn').addEventListener('click', () => {
      if (window.confirm('Hapus semua catatan minum hari ini?')) {
        act('POST', '/api/reset-today');
      }
    });

    reportPermission(supported ? Notification.permission : 'unsupported');
    setInterval(pollNotifications, 15000);
  </script>
</body>
</html>
"#;
